pub mod fee;
pub mod pool;
pub mod pool_id;
pub mod pool_state;
pub mod reserve_gate;

pub use fee::{Fee, FeeError};
pub use pool::{Pool, PoolWrapper};
pub use pool_id::PoolId;
pub use pool_state::{CalculationError, PoolSide, PoolState};
pub use reserve_gate::{ReserveGate, ReserveRecord, UpdateError, UpdateOutcome};
