/// Data Synchronization Layer
///
/// This layer sits between the reserve transport and the logic layer. It provides:
///
/// - The market registry of tokens, pools and evaluators built from a TOML topology
/// - Runtime service settings from the environment
/// - An observation-driven service that feeds reserve updates to the evaluators and
///   emits opportunity updates
///
/// Fetching reserves (polling, event subscriptions) stays outside: the transport only
/// holds an observation sender.
pub mod config;
pub mod markets;
pub mod service;


// Re-export main components for easy usage
pub use config::ServiceConfig;
pub use markets::{Market, MarketConfigSection, ObservationReport, PoolConfig, StrategyConfig, TokenConfig};
pub use service::{EvaluationService, ServiceStats};
