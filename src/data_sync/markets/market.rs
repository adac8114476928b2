use super::market_config::{MarketConfigSection, PoolConfig, StrategyConfig};
use crate::logic::arbitrage_evaluator::{ArbitrageEvaluator, EvaluatorError};
use crate::logic::graph::SwapPath;
use crate::logic::pools::{Pool, PoolId, PoolWrapper, UpdateOutcome};
use crate::logic::types::{EvaluatorConfig, OpportunityUpdate, ReserveObservation};
use crate::Token;
use ahash::RandomState;
use alloy_primitives::Address;
use dashmap::DashMap;
use eyre::{Result, eyre};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// What one observation did to the market.
#[derive(Clone, Debug, PartialEq)]
pub struct ObservationReport {
    pub outcome: UpdateOutcome,
    /// Number of evaluators that reran their search.
    pub recalculated: usize,
    pub updates: Vec<OpportunityUpdate>,
}

/// The market contains all tokens, pools and evaluators.
///
/// A pool can be watched by several evaluators, as the borrow pool of one and a swap hop of
/// another. Observations are applied to the pool once and the outcome is fanned out.
#[derive(Default)]
pub struct Market {
    tokens: DashMap<Address, Arc<Token>, RandomState>,
    pools: DashMap<PoolId, PoolWrapper, RandomState>,
    evaluators: Vec<ArbitrageEvaluator>,
    // pool -> indices into evaluators
    pool_evaluators: HashMap<PoolId, Vec<usize>, RandomState>,
}

impl Market {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a [`Token`] reference to the market. If the token already exists the existing one is returned.
    pub fn add_token<T: Into<Arc<Token>>>(&self, token: T) -> Arc<Token> {
        let token: Arc<Token> = token.into();
        self.tokens.entry(token.get_address()).or_insert(token).clone()
    }

    pub fn get_token(&self, address: &Address) -> Option<Arc<Token>> {
        self.tokens.get(address).map(|token| token.clone())
    }

    /// Get a token, registering a bare one for unknown addresses.
    pub fn get_or_add_token(&self, address: Address) -> Arc<Token> {
        self.add_token(Token::new(address))
    }

    /// Add a new pool to the market. If a pool with the same id exists nothing will happen
    /// and the existing pool is returned.
    pub fn add_pool<T: Into<PoolWrapper>>(&self, pool: T) -> PoolWrapper {
        let pool: PoolWrapper = pool.into();
        self.add_token(pool.get_token0().clone());
        self.add_token(pool.get_token1().clone());
        self.pools.entry(pool.get_pool_id()).or_insert(pool).clone()
    }

    /// Get a pool reference to the pool by the id.
    pub fn get_pool(&self, pool_id: &PoolId) -> Option<PoolWrapper> {
        self.pools.get(pool_id).map(|pool| pool.clone())
    }

    pub fn contains_pool(&self, pool_id: &PoolId) -> bool {
        self.pools.contains_key(pool_id)
    }

    pub fn pools_len(&self) -> usize {
        self.pools.len()
    }

    pub fn tokens_len(&self) -> usize {
        self.tokens.len()
    }

    pub fn evaluators(&self) -> &[ArbitrageEvaluator] {
        &self.evaluators
    }

    pub fn get_evaluator(&self, name: &str) -> Option<&ArbitrageEvaluator> {
        self.evaluators.iter().find(|evaluator| evaluator.get_name() == name)
    }

    /// Number of evaluators watching the pool
    pub fn pool_watchers_len(&self, pool_id: &PoolId) -> usize {
        self.pool_evaluators.get(pool_id).map_or(0, Vec::len)
    }

    /// Register an evaluator. All of its pools must already be in the market as the very same
    /// instances, otherwise it would never see the reserve updates.
    pub fn add_evaluator(&mut self, evaluator: ArbitrageEvaluator) -> Result<()> {
        if self.get_evaluator(evaluator.get_name()).is_some() {
            return Err(eyre!("evaluator {} already exists", evaluator.get_name()));
        }

        let pools = std::iter::once(evaluator.get_borrow_pool()).chain(evaluator.get_swap_path().pools.iter());
        for pool in pools {
            match self.pools.get(&pool.get_pool_id()) {
                Some(registered) if Arc::ptr_eq(&registered.pool, &pool.pool) => {}
                Some(_) => return Err(eyre!("evaluator {}: pool {} is a different instance than the registered one", evaluator.get_name(), pool)),
                None => return Err(eyre!("evaluator {}: pool {} is not in the market", evaluator.get_name(), pool)),
            }
        }

        let index = self.evaluators.len();
        for pool_id in evaluator.pool_ids() {
            self.pool_evaluators.entry(pool_id).or_default().push(index);
        }
        info!("Evaluator {} added, watching {} pools", evaluator.get_name(), evaluator.pool_ids().len());
        self.evaluators.push(evaluator);

        Ok(())
    }

    /// Apply one reserve observation and let every watching evaluator react to it.
    ///
    /// Unknown pools and stale blocks are rejected without touching any state.
    pub fn apply_observation(&mut self, observation: &ReserveObservation) -> Result<ObservationReport, EvaluatorError> {
        let pool = self.get_pool(&observation.pool_id).ok_or(EvaluatorError::UnknownPool(observation.pool_id))?;
        let outcome = pool.apply_reserves(observation.reserve0, observation.reserve1, observation.block_number)?;

        let mut report = ObservationReport { outcome, recalculated: 0, updates: Vec::new() };
        let Some(indices) = self.pool_evaluators.get(&observation.pool_id) else {
            return Ok(report);
        };

        for &index in indices {
            let evaluator = &mut self.evaluators[index];
            let had_opportunity = evaluator.best_opportunity().is_some();
            if evaluator.on_pool_outcome(outcome) {
                report.recalculated += 1;
                if let Some(update) = opportunity_update(evaluator, had_opportunity) {
                    report.updates.push(update);
                }
            }
        }

        debug!(
            "Block {}: pool {} {}, {} evaluators recalculated",
            observation.block_number, observation.pool_id, outcome, report.recalculated
        );
        Ok(report)
    }

    /// Recalculate every evaluator from the current reserves, e.g. once at start-up.
    pub fn refresh_all(&mut self) -> Vec<OpportunityUpdate> {
        self.evaluators
            .iter_mut()
            .filter_map(|evaluator| {
                let had_opportunity = evaluator.best_opportunity().is_some();
                evaluator.recalculate();
                opportunity_update(evaluator, had_opportunity)
            })
            .collect()
    }

    /// Build the tokens, pools and evaluators described by the config.
    pub fn from_config(config: &MarketConfigSection) -> Result<Self> {
        let mut market = Market::new();

        for token in config.tokens.iter() {
            market.add_token(Token::new_with_data(token.address, token.symbol.clone(), token.name.clone(), token.decimals));
        }
        for pool in config.pools.iter() {
            market.add_pool(market.build_pool(pool)?);
        }
        for strategy in config.strategies.iter() {
            let evaluator = market.build_evaluator(strategy, config.optimizer)?;
            market.add_evaluator(evaluator)?;
        }

        info!(
            "Market loaded: {} tokens, {} pools, {} evaluators",
            market.tokens_len(),
            market.pools_len(),
            market.evaluators.len()
        );
        Ok(market)
    }

    fn build_pool(&self, config: &PoolConfig) -> Result<Pool> {
        if self.contains_pool(&PoolId::Address(config.address)) {
            return Err(eyre!("pool {} is configured twice", config.address));
        }
        let (fee0, fee1) = config.fees();
        let pool = Pool::with_fees(config.address, self.get_or_add_token(config.token0), self.get_or_add_token(config.token1), fee0, fee1)?;

        Ok(match &config.name {
            Some(name) => pool.with_name(name),
            None => pool,
        })
    }

    fn build_evaluator(&self, strategy: &StrategyConfig, optimizer: EvaluatorConfig) -> Result<ArbitrageEvaluator> {
        let lookup_pool = |address: &Address| {
            self.get_pool(&PoolId::Address(*address)).ok_or_else(|| eyre!("strategy {}: unknown pool {}", strategy.name, address))
        };
        let lookup_token =
            |address: &Address| self.get_token(address).ok_or_else(|| eyre!("strategy {}: unknown token {}", strategy.name, address));

        let tokens = strategy.tokens.iter().map(lookup_token).collect::<Result<Vec<_>>>()?;
        let pools = strategy.pools.iter().map(lookup_pool).collect::<Result<Vec<_>>>()?;
        let swap_path = SwapPath::new(tokens, pools).map_err(|e| eyre!("strategy {}: {}", strategy.name, e))?;

        let borrow_pool = lookup_pool(&strategy.borrow_pool)?;
        let borrow_token = lookup_token(&strategy.borrow_token)?;

        ArbitrageEvaluator::new(strategy.name.clone(), borrow_pool, &borrow_token, swap_path, optimizer)
            .map_err(|e| eyre!("strategy {}: {}", strategy.name, e))
    }
}

// Found for a current opportunity, Cleared only when one was dropped
fn opportunity_update(evaluator: &ArbitrageEvaluator, had_opportunity: bool) -> Option<OpportunityUpdate> {
    match evaluator.best_opportunity() {
        Some(opportunity) => Some(OpportunityUpdate::Found(opportunity.clone())),
        None if had_opportunity => Some(OpportunityUpdate::Cleared { evaluator: evaluator.get_name().to_string() }),
        None => None,
    }
}
