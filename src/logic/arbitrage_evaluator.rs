use super::graph::SwapPath;
use super::optimizer::maximize;
use super::path_pricer::{PathPricer, PricingError};
use super::pools::{PoolId, PoolState, PoolWrapper, UpdateError, UpdateOutcome};
use super::types::{EvaluatorConfig, Opportunity, ReserveObservation};
use crate::Token;
use crate::utils::math::{f64_to_u256, signed_difference, u256_to_f64};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluatorError {
    #[error("path shape mismatch: {0}")]
    PathShapeMismatch(String),
    #[error("pool {0} is not watched by this evaluator")]
    UnknownPool(PoolId),
    #[error(transparent)]
    Update(#[from] UpdateError),
}

/// Owns one borrow pool and one swap path and keeps the best flash-borrow opportunity
/// over them up to date.
///
/// The borrow token is taken out of the borrow pool, routed through the swap path and the
/// pool is repaid in its other token. The search only reruns when a watched pool reports
/// changed reserves, or on the very first update after construction.
pub struct ArbitrageEvaluator {
    name: String,
    borrow_pool: PoolWrapper,
    borrow_token: Arc<Token>,
    repay_token: Arc<Token>,
    swap_path: SwapPath,
    config: EvaluatorConfig,
    evaluated: bool,
    best: Option<Opportunity>,
}

impl ArbitrageEvaluator {
    pub fn new(
        name: impl Into<String>,
        borrow_pool: PoolWrapper,
        borrow_token: &Arc<Token>,
        swap_path: SwapPath,
        config: EvaluatorConfig,
    ) -> Result<Self, EvaluatorError> {
        let name = name.into();

        let repay_token = borrow_pool.get_other_token(&borrow_token.get_address()).cloned().ok_or_else(|| {
            EvaluatorError::PathShapeMismatch(format!("borrow token {} is not held by borrow pool {}", borrow_token, borrow_pool))
        })?;

        match swap_path.first_token() {
            Some(first) if first == borrow_token => {}
            first => {
                return Err(EvaluatorError::PathShapeMismatch(format!(
                    "swap path starts at {:?}, expected the borrowed token {}",
                    first.map(|t| t.get_address()),
                    borrow_token.get_address()
                )));
            }
        }
        match swap_path.last_token() {
            Some(last) if *last == repay_token => {}
            last => {
                return Err(EvaluatorError::PathShapeMismatch(format!(
                    "swap path ends at {:?}, expected the repay token {}",
                    last.map(|t| t.get_address()),
                    repay_token.get_address()
                )));
            }
        }
        // the borrow pool is locked for the duration of the flash swap
        if swap_path.contains_pool(&borrow_pool.get_pool_id()) {
            return Err(EvaluatorError::PathShapeMismatch(format!("borrow pool {} also appears in the swap path", borrow_pool)));
        }

        debug!("Evaluator {} created: borrow {} from {} through {}", name, borrow_token, borrow_pool, swap_path);

        Ok(Self {
            name,
            borrow_pool,
            borrow_token: borrow_token.clone(),
            repay_token,
            swap_path,
            config,
            evaluated: false,
            best: None,
        })
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_borrow_pool(&self) -> &PoolWrapper {
        &self.borrow_pool
    }

    pub fn get_borrow_token(&self) -> &Arc<Token> {
        &self.borrow_token
    }

    pub fn get_repay_token(&self) -> &Arc<Token> {
        &self.repay_token
    }

    pub fn get_swap_path(&self) -> &SwapPath {
        &self.swap_path
    }

    pub fn get_config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Current best opportunity. `None` until a recalculation found positive profit.
    pub fn best_opportunity(&self) -> Option<&Opportunity> {
        self.best.as_ref()
    }

    /// The borrow pool first, then the swap path pools in hop order.
    pub fn pool_ids(&self) -> Vec<PoolId> {
        std::iter::once(self.borrow_pool.get_pool_id()).chain(self.swap_path.pools.iter().map(|p| p.get_pool_id())).collect()
    }

    fn get_pool(&self, pool_id: &PoolId) -> Option<&PoolWrapper> {
        if self.borrow_pool.get_pool_id() == *pool_id {
            return Some(&self.borrow_pool);
        }
        self.swap_path.pools.iter().find(|pool| pool.get_pool_id() == *pool_id)
    }

    /// Apply an observation to the watched pool and recalculate if anything changed.
    ///
    /// Returns whether a recalculation ran. A stale observation is rejected and leaves both
    /// the pool and the current opportunity untouched.
    pub fn on_reserve_update(&mut self, observation: &ReserveObservation) -> Result<bool, EvaluatorError> {
        let pool = self.get_pool(&observation.pool_id).ok_or(EvaluatorError::UnknownPool(observation.pool_id))?;
        let outcome = pool.apply_reserves(observation.reserve0, observation.reserve1, observation.block_number)?;
        Ok(self.on_pool_outcome(outcome))
    }

    /// React to a gate outcome produced elsewhere, for pools shared between evaluators.
    pub fn on_pool_outcome(&mut self, outcome: UpdateOutcome) -> bool {
        if outcome.is_changed() || !self.evaluated {
            self.recalculate();
            true
        } else {
            false
        }
    }

    /// Rerun the search over a fresh reserve snapshot and replace the current opportunity.
    pub fn recalculate(&mut self) -> Option<&Opportunity> {
        self.evaluated = true;

        let borrow_state = self.borrow_pool.snapshot();
        let pricer = PathPricer::snapshot(&self.swap_path);

        self.best = match self.find_opportunity(&borrow_state, &pricer) {
            Ok(Some(opportunity)) => {
                info!("Opportunity found: {}", opportunity);
                Some(opportunity)
            }
            Ok(None) => {
                debug!("Evaluator {}: no profitable borrow amount", self.name);
                None
            }
            Err(e) if e.is_fatal() => {
                error!("Evaluator {}: path cannot be priced: {}", self.name, e);
                None
            }
            Err(e) => {
                debug!("Evaluator {}: no opportunity this cycle: {}", self.name, e);
                None
            }
        };

        self.best.as_ref()
    }

    fn find_opportunity(&self, borrow_state: &PoolState, pricer: &PathPricer) -> Result<Option<Opportunity>, PricingError> {
        let borrow_address = self.borrow_token.get_address();
        let borrow_side = borrow_state.side_of(&borrow_address)?;
        let borrow_reserve = borrow_state.reserve(borrow_side);
        if borrow_reserve.is_zero() {
            return Ok(None);
        }

        let profit = |x: f64| -> f64 {
            let amount = f64_to_u256(x.round());
            let Ok(amount_out) = pricer.amount_out_along_path(&borrow_address, amount) else {
                return f64::NEG_INFINITY;
            };
            let Ok(repay) = borrow_state.amount_in(&borrow_address, amount) else {
                return f64::NEG_INFINITY;
            };
            signed_difference(amount_out, repay)
        };

        let upper = u256_to_f64(borrow_reserve);
        let tolerance = self.config.tolerance_for(upper);
        let result = match maximize(profit, 1.0, upper, tolerance, self.config.max_iterations) {
            Ok(result) => result,
            Err(e) => {
                warn!("Evaluator {}: optimizer rejected the domain: {}", self.name, e);
                return Ok(None);
            }
        };
        if !result.converged {
            warn!(
                "Evaluator {}: optimizer stopped after {} iterations without converging, using best estimate {}",
                self.name, result.iterations, result.argmax
            );
        }
        if result.argmax <= 0.0 || result.value <= 0.0 {
            return Ok(None);
        }

        // exact recomputation at the chosen integer amount
        let borrow_amount = f64_to_u256(result.argmax.round());
        let repay_amount = borrow_state.amount_in(&borrow_address, borrow_amount)?;
        let quotes = pricer.quotes_along_path(&borrow_address, borrow_amount)?;
        let amount_out = quotes.last().map(|quote| quote.amount_out).unwrap_or_default();
        if amount_out <= repay_amount {
            return Ok(None);
        }

        let block_number = borrow_state.last_block.max(pricer.last_block());

        Ok(Some(Opportunity {
            evaluator: self.name.clone(),
            borrow_pool: self.borrow_pool.get_pool_id(),
            borrow_token: self.borrow_token.clone(),
            borrow_amount,
            borrow_pool_amounts: borrow_side.split(borrow_amount),
            repay_amount,
            profit_amount: amount_out - repay_amount,
            profit_token: self.repay_token.clone(),
            swap_path_hash: self.swap_path.swap_path_hash,
            swap_pools: quotes.iter().map(|quote| quote.pool).collect(),
            swap_pool_amounts: quotes.iter().map(|quote| quote.allocation()).collect(),
            block_number,
            converged: result.converged,
            discovered_at: Instant::now(),
        }))
    }
}
