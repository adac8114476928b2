pub mod market;
pub mod market_config;

pub use market::{Market, ObservationReport};
pub use market_config::{MarketConfigSection, PoolConfig, StrategyConfig, TokenConfig};
