use super::graph::SwapPathHash;
use super::pools::PoolId;
use crate::Token;
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

/// One reserve reading for one pool, from a poll or a pushed event alike.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveObservation {
    pub pool_id: PoolId,
    pub reserve0: U256,
    pub reserve1: U256,
    pub block_number: u64,
}

impl ReserveObservation {
    pub fn new(pool_id: impl Into<PoolId>, reserve0: U256, reserve1: U256, block_number: u64) -> Self {
        Self { pool_id: pool_id.into(), reserve0, reserve1, block_number }
    }
}

/// The best flash-borrow-and-swap found for the current reserves.
///
/// Either fully populated and consistent, or absent: an evaluator holds an
/// `Option<Opportunity>` and replaces it wholesale on every recalculation.
#[derive(Clone, Debug, PartialEq)]
pub struct Opportunity {
    pub evaluator: String,
    pub borrow_pool: PoolId,
    pub borrow_token: Arc<Token>,
    pub borrow_amount: U256,
    /// `(amount0, amount1)` taken out of the borrow pool.
    pub borrow_pool_amounts: (U256, U256),
    pub repay_amount: U256,
    pub profit_amount: U256,
    /// Same token as the one repaid to the borrow pool.
    pub profit_token: Arc<Token>,
    pub swap_path_hash: SwapPathHash,
    pub swap_pools: Vec<PoolId>,
    /// Per hop `(amount0, amount1)`, the output side non-zero.
    pub swap_pool_amounts: Vec<(U256, U256)>,
    /// Freshest block seen across the involved pools when this was computed.
    pub block_number: Option<u64>,
    pub converged: bool,
    pub discovered_at: Instant,
}

impl Opportunity {
    pub fn is_profitable(&self, min_profit: U256) -> bool {
        self.profit_amount > min_profit
    }

    /// Output of the last hop, which must cover both the repayment and the profit.
    pub fn expected_output_amount(&self) -> U256 {
        self.repay_amount + self.profit_amount
    }
}

impl Display for Opportunity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] borrow {} {} on {}, repay {} {}, profit {} {}",
            self.evaluator,
            self.borrow_token.to_float(self.borrow_amount),
            self.borrow_token,
            self.borrow_pool,
            self.profit_token.to_float(self.repay_amount),
            self.profit_token,
            self.profit_token.to_float(self.profit_amount),
            self.profit_token,
        )
    }
}

/// What an evaluator reports after it recalculated.
#[derive(Clone, Debug, PartialEq)]
pub enum OpportunityUpdate {
    Found(Opportunity),
    Cleared { evaluator: String },
}

impl OpportunityUpdate {
    pub fn evaluator(&self) -> &str {
        match self {
            OpportunityUpdate::Found(opportunity) => &opportunity.evaluator,
            OpportunityUpdate::Cleared { evaluator } => evaluator,
        }
    }
}

/// Search settings for the borrow-amount optimizer.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvaluatorConfig {
    /// Absolute interval width, in raw token units, at which the search stops.
    pub tolerance: f64,
    /// Width relative to the upper bound; the larger of the two applies.
    pub relative_tolerance: f64,
    pub max_iterations: usize,
}

impl EvaluatorConfig {
    pub fn tolerance_for(&self, upper_bound: f64) -> f64 {
        self.tolerance.max(self.relative_tolerance * upper_bound)
    }
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self { tolerance: 1.0, relative_tolerance: 1e-9, max_iterations: 200 }
    }
}
