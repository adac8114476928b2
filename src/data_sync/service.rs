use crate::data_sync::{
    config::ServiceConfig,
    markets::{Market, MarketConfigSection},
};
use crate::logic::arbitrage_evaluator::EvaluatorError;
use crate::logic::types::{OpportunityUpdate, ReserveObservation};
use crate::utils::config_loader::ArbConfigLoader;
use eyre::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Counters of one service run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceStats {
    pub observations: u64,
    pub stale_observations: u64,
    pub unknown_pool_observations: u64,
    pub recalculations: u64,
    pub opportunities_emitted: u64,
    pub opportunities_below_min_profit: u64,
    pub opportunities_cleared: u64,
}

/// Observation-driven evaluation service
///
/// The transport side (block poller, event subscription) holds an observation sender and
/// pushes [`ReserveObservation`]s; the service applies them one at a time to its [`Market`]
/// and emits [`OpportunityUpdate`]s. The core never calls into the transport.
pub struct EvaluationService {
    config: ServiceConfig,
    market: Market,

    // Channels for communication
    observation_tx: mpsc::Sender<ReserveObservation>,
    observation_rx: mpsc::Receiver<ReserveObservation>,
}

impl EvaluationService {
    pub fn new(config: ServiceConfig, market: Market) -> Result<Self> {
        config.validate()?;
        info!("Initializing EvaluationService with {} evaluators over {} pools", market.evaluators().len(), market.pools_len());

        let (observation_tx, observation_rx) = mpsc::channel(config.channel_buffer_size);
        Ok(Self { config, market, observation_tx, observation_rx })
    }

    /// Build the market from a TOML topology file.
    pub async fn from_config_file(config: ServiceConfig, file_name: String) -> Result<Self> {
        let market_config = MarketConfigSection::load_section_from_file(file_name).await?;
        Self::new(config, Market::from_config(&market_config)?)
    }

    /// A sender for the transport side. The run loop ends once every sender is dropped.
    pub fn observation_sender(&self) -> mpsc::Sender<ReserveObservation> {
        self.observation_tx.clone()
    }

    pub fn get_config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    /// Spawn [`Self::run`] on the runtime and hand back the outbound opportunity channel.
    pub fn start(self) -> (JoinHandle<ServiceStats>, mpsc::Receiver<OpportunityUpdate>) {
        let (opportunity_tx, opportunity_rx) = mpsc::channel(self.config.channel_buffer_size);
        let task = tokio::spawn(self.run(opportunity_tx));
        (task, opportunity_rx)
    }

    /// Evaluate every strategy once, then process observations until all senders are gone or
    /// nobody listens to the opportunities anymore.
    pub async fn run(self, opportunity_tx: mpsc::Sender<OpportunityUpdate>) -> ServiceStats {
        let EvaluationService { config, mut market, observation_tx, mut observation_rx } = self;
        // only external senders keep the loop alive
        drop(observation_tx);

        let mut stats = ServiceStats::default();
        info!("EvaluationService started");

        let updates = market.refresh_all();
        stats.recalculations += market.evaluators().len() as u64;
        if !emit_updates(&config, &mut stats, &opportunity_tx, updates).await {
            error!("Opportunity channel is closed, stopping evaluation");
            return stats;
        }

        while let Some(observation) = observation_rx.recv().await {
            stats.observations += 1;

            match market.apply_observation(&observation) {
                Ok(report) => {
                    stats.recalculations += report.recalculated as u64;
                    if !emit_updates(&config, &mut stats, &opportunity_tx, report.updates).await {
                        error!("Opportunity channel is closed, stopping evaluation");
                        break;
                    }
                }
                Err(EvaluatorError::UnknownPool(pool_id)) => {
                    stats.unknown_pool_observations += 1;
                    warn!("Block {}: observation for unknown pool {}", observation.block_number, pool_id);
                }
                Err(EvaluatorError::Update(e)) => {
                    stats.stale_observations += 1;
                    warn!("Pool {}: {}", observation.pool_id, e);
                }
                Err(e) => {
                    error!("Pool {}: failed to apply observation: {}", observation.pool_id, e);
                }
            }

            if config.stats_log_interval > 0 && stats.observations % config.stats_log_interval == 0 {
                info!("EvaluationService stats: {:?}", stats);
            }
        }

        info!("EvaluationService stopped: {:?}", stats);
        stats
    }
}

// false once the receiving side is gone
async fn emit_updates(
    config: &ServiceConfig,
    stats: &mut ServiceStats,
    opportunity_tx: &mpsc::Sender<OpportunityUpdate>,
    updates: Vec<OpportunityUpdate>,
) -> bool {
    for update in updates {
        match &update {
            OpportunityUpdate::Found(opportunity) if !opportunity.is_profitable(config.min_profit_amount) => {
                stats.opportunities_below_min_profit += 1;
                debug!("Skipping opportunity below min profit: {}", opportunity);
                continue;
            }
            OpportunityUpdate::Found(_) => stats.opportunities_emitted += 1,
            OpportunityUpdate::Cleared { .. } => stats.opportunities_cleared += 1,
        }
        if opportunity_tx.send(update).await.is_err() {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_service_creation() -> eyre::Result<()> {
        let service = EvaluationService::new(ServiceConfig::default(), Market::new())?;
        assert_eq!(service.get_config().channel_buffer_size, 100);
        assert_eq!(service.market().pools_len(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let config = ServiceConfig { channel_buffer_size: 0, ..ServiceConfig::default() };
        assert!(EvaluationService::new(config, Market::new()).is_err());
    }

    #[tokio::test]
    async fn test_run_ends_without_senders() -> eyre::Result<()> {
        let service = EvaluationService::new(ServiceConfig::default(), Market::new())?;
        let (task, mut opportunity_rx) = service.start();

        let stats = task.await?;
        assert_eq!(stats, ServiceStats::default());
        assert!(opportunity_rx.recv().await.is_none());
        Ok(())
    }
}
