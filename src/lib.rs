// Three-Layer Architecture
pub mod data_sync; // Data Layer: market registry, observation-driven service
pub mod logic; // Logic Layer: pool pricing, swap paths, optimizer, evaluators

// Common utilities and types
pub mod utils;

// Re-export key components from each layer
pub use data_sync::{EvaluationService, Market, MarketConfigSection, ObservationReport, ServiceConfig, ServiceStats};
pub use logic::{
    ArbitrageEvaluator, CalculationError, EvaluatorConfig, EvaluatorError, Fee, FeeError, HopQuote, OptimizeError, OptimizeResult,
    Opportunity, OpportunityUpdate, PathError, PathPricer, Pool, PoolId, PoolSide, PoolState, PoolWrapper, PricingError,
    ReserveGate, ReserveObservation, ReserveRecord, SwapPath, SwapPathHash, UpdateError, UpdateOutcome, maximize,
};
pub use utils::{LoadConfigError, Token};
