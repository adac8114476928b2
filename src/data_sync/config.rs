use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Runtime settings for the evaluation service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Buffer size of the observation and opportunity channels
    pub channel_buffer_size: usize,
    /// Opportunities at or below this profit (raw units of the profit token) are not emitted
    pub min_profit_amount: U256,
    /// Log service stats every N observations, 0 disables it
    pub stats_log_interval: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { channel_buffer_size: 100, min_profit_amount: U256::ZERO, stats_log_interval: 1000 }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> eyre::Result<Self> {
        let mut config = Self::default();

        if let Ok(buffer_size_str) = std::env::var("CHANNEL_BUFFER_SIZE") {
            config.channel_buffer_size =
                buffer_size_str.parse().map_err(|e| eyre::eyre!("Invalid CHANNEL_BUFFER_SIZE: {}", e))?;
        }

        if let Ok(min_profit_str) = std::env::var("MIN_PROFIT_AMOUNT") {
            config.min_profit_amount = min_profit_str.parse().map_err(|e| eyre::eyre!("Invalid MIN_PROFIT_AMOUNT: {}", e))?;
        }

        if let Ok(interval_str) = std::env::var("STATS_LOG_INTERVAL") {
            config.stats_log_interval = interval_str.parse().map_err(|e| eyre::eyre!("Invalid STATS_LOG_INTERVAL: {}", e))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> eyre::Result<()> {
        // tokio::sync::mpsc::channel panics on a zero capacity
        if self.channel_buffer_size == 0 {
            return Err(eyre::eyre!("CHANNEL_BUFFER_SIZE must be greater than zero"));
        }
        Ok(())
    }
}
