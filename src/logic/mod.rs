/// Logic Layer - flash-borrow evaluation
///
/// This layer is responsible for:
/// - Constant-product pool pricing and reserve bookkeeping
/// - Fixed swap paths and multi-hop pricing over a reserve snapshot
/// - Golden-section search for the most profitable borrow amount
/// - Keeping one best opportunity per borrow pool and swap path
pub mod arbitrage_evaluator;
pub mod graph;
pub mod optimizer;
pub mod path_pricer;
pub mod pools;
pub mod types;

// Re-export key components from the logic layer
pub use arbitrage_evaluator::{ArbitrageEvaluator, EvaluatorError};
pub use graph::{PathError, SwapPath, SwapPathHash, generate_swap_path_hash};
pub use optimizer::{OptimizeError, OptimizeResult, maximize};
pub use path_pricer::{HopQuote, PathPricer, PricingError};
pub use pools::{
    CalculationError, Fee, FeeError, Pool, PoolId, PoolSide, PoolState, PoolWrapper, ReserveGate, ReserveRecord, UpdateError, UpdateOutcome,
};
pub use types::{EvaluatorConfig, Opportunity, OpportunityUpdate, ReserveObservation};
