use super::graph::SwapPath;
use super::pools::{CalculationError, PoolId, PoolSide, PoolState};
use alloy_primitives::{Address, U256};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    #[error("hop {hop}: token {token} is held by neither side of pool {pool}")]
    PathTokenMismatch { hop: usize, pool: PoolId, token: Address },
    #[error(transparent)]
    Calculation(#[from] CalculationError),
}

impl PricingError {
    /// Configuration errors that no future reserve update can fix.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PricingError::PathTokenMismatch { .. } | PricingError::Calculation(CalculationError::UnknownToken(_)))
    }
}

/// One priced hop of a traversal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HopQuote {
    pub pool: PoolId,
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    pub amount_out: U256,
    pub output_side: PoolSide,
}

impl HopQuote {
    /// `(amount0, amount1)` as a pool swap call expects it: the output side carries the amount.
    pub fn allocation(&self) -> (U256, U256) {
        self.output_side.split(self.amount_out)
    }
}

/// Multi-hop pricing over a reserve snapshot taken once from a [`SwapPath`].
///
/// Every evaluation in one optimizer run sees the same reserves even if the live pools
/// are updated meanwhile.
#[derive(Clone, Debug)]
pub struct PathPricer {
    pools: Vec<(PoolId, PoolState)>,
}

impl PathPricer {
    pub fn new(pools: Vec<(PoolId, PoolState)>) -> Self {
        Self { pools }
    }

    pub fn snapshot(path: &SwapPath) -> Self {
        Self::new(path.pools.iter().map(|pool| (pool.get_pool_id(), pool.snapshot())).collect())
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Newest block among the snapshotted pools.
    pub fn last_block(&self) -> Option<u64> {
        self.pools.iter().filter_map(|(_, state)| state.last_block).max()
    }

    fn quote_hop(&self, hop: usize, token_in: Address, amount_in: U256) -> Result<HopQuote, PricingError> {
        let (pool_id, state) = &self.pools[hop];
        let input_side = state
            .side_of(&token_in)
            .map_err(|_| PricingError::PathTokenMismatch { hop, pool: *pool_id, token: token_in })?;
        let output_side = input_side.opposite();
        let amount_out = state.amount_out(&token_in, amount_in)?;

        Ok(HopQuote { pool: *pool_id, token_in, token_out: state.token(output_side), amount_in, amount_out, output_side })
    }

    /// Feed `amount_in` of `token_in` through every hop and return what comes out of the last one.
    pub fn amount_out_along_path(&self, token_in: &Address, amount_in: U256) -> Result<U256, PricingError> {
        let mut token = *token_in;
        let mut amount = amount_in;
        for hop in 0..self.pools.len() {
            let quote = self.quote_hop(hop, token, amount)?;
            token = quote.token_out;
            amount = quote.amount_out;
        }
        Ok(amount)
    }

    /// The same traversal as [`Self::amount_out_along_path`], keeping every hop.
    pub fn quotes_along_path(&self, token_in: &Address, amount_in: U256) -> Result<Vec<HopQuote>, PricingError> {
        let mut quotes: Vec<HopQuote> = Vec::with_capacity(self.pools.len());
        let mut token = *token_in;
        let mut amount = amount_in;
        for hop in 0..self.pools.len() {
            let quote = self.quote_hop(hop, token, amount)?;
            token = quote.token_out;
            amount = quote.amount_out;
            quotes.push(quote);
        }
        Ok(quotes)
    }

    /// Per-hop `(amount0, amount1)`, the output side non-zero.
    pub fn allocations_along_path(&self, token_in: &Address, amount_in: U256) -> Result<Vec<(U256, U256)>, PricingError> {
        Ok(self.quotes_along_path(token_in, amount_in)?.iter().map(HopQuote::allocation).collect())
    }
}
