use super::fee::Fee;
use super::pool_id::PoolId;
use super::pool_state::PoolState;
use super::reserve_gate::{ReserveGate, UpdateError, UpdateOutcome};
use crate::Token;
use alloy_primitives::{Address, U256};
use eyre::{Result, eyre};
use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;
use tracing::debug;

/// A constant-product pool living for the whole process.
///
/// Identity and fees are fixed at construction, token0/token1 never swap roles.
/// Reserves only change through the [`ReserveGate`].
pub struct Pool {
    address: Address,
    name: Option<String>,
    token0: Arc<Token>,
    token1: Arc<Token>,
    fee0: Fee,
    fee1: Fee,
    gate: ReserveGate,
}

impl Pool {
    pub fn new(address: Address, token0: Arc<Token>, token1: Arc<Token>, fee: Fee) -> Result<Self> {
        Self::with_fees(address, token0, token1, fee, fee)
    }

    pub fn with_fees(address: Address, token0: Arc<Token>, token1: Arc<Token>, fee0: Fee, fee1: Fee) -> Result<Self> {
        if token0 == token1 {
            return Err(eyre!("pool {} must hold two distinct tokens, got {} twice", address, token0.get_address()));
        }
        Ok(Self { address, name: None, token0, token1, fee0, fee1, gate: ReserveGate::default() })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Seed reserves before the first observation. The block marker stays unset.
    pub fn with_reserves(mut self, reserve0: U256, reserve1: U256) -> Self {
        self.gate = ReserveGate::new(reserve0, reserve1);
        self
    }

    pub fn get_address(&self) -> Address {
        self.address
    }

    pub fn get_pool_id(&self) -> PoolId {
        PoolId::Address(self.address)
    }

    pub fn get_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| format!("{}-{}", self.token0.get_symbol(), self.token1.get_symbol()))
    }

    pub fn get_token0(&self) -> &Arc<Token> {
        &self.token0
    }

    pub fn get_token1(&self) -> &Arc<Token> {
        &self.token1
    }

    pub fn get_tokens(&self) -> Vec<Address> {
        vec![self.token0.get_address(), self.token1.get_address()]
    }

    pub fn contains_token(&self, token: &Address) -> bool {
        self.token0.get_address() == *token || self.token1.get_address() == *token
    }

    /// The token on the other side of `token`, if `token` is held by this pool.
    pub fn get_other_token(&self, token: &Address) -> Option<&Arc<Token>> {
        if self.token0.get_address() == *token {
            Some(&self.token1)
        } else if self.token1.get_address() == *token {
            Some(&self.token0)
        } else {
            None
        }
    }

    pub fn get_fee0(&self) -> Fee {
        self.fee0
    }

    pub fn get_fee1(&self) -> Fee {
        self.fee1
    }

    pub fn get_reserves(&self) -> (U256, U256) {
        let record = self.gate.snapshot();
        (record.reserve0, record.reserve1)
    }

    pub fn last_block(&self) -> Option<u64> {
        self.gate.snapshot().last_block
    }

    pub fn apply_reserves(&self, reserve0: U256, reserve1: U256, block: u64) -> Result<UpdateOutcome, UpdateError> {
        let outcome = self.gate.apply(reserve0, reserve1, block)?;
        if outcome.is_changed() {
            debug!(pool = %self.get_name(), block, %reserve0, %reserve1, "reserves updated");
        }
        Ok(outcome)
    }

    /// Copy out a consistent pricing view of the current reserves.
    pub fn snapshot(&self) -> PoolState {
        let record = self.gate.snapshot();
        PoolState {
            token0: self.token0.get_address(),
            token1: self.token1.get_address(),
            reserve0: record.reserve0,
            reserve1: record.reserve1,
            fee0: self.fee0,
            fee1: self.fee1,
            last_block: record.last_block,
        }
    }
}

/// Shared handle to a [`Pool`]. Equality, ordering and hashing go through the pool id.
pub struct PoolWrapper {
    pub pool: Arc<Pool>,
}

impl PartialOrd for PoolWrapper {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for PoolWrapper {}

impl Ord for PoolWrapper {
    fn cmp(&self, other: &Self) -> Ordering {
        self.get_pool_id().cmp(&other.get_pool_id())
    }
}

impl Display for PoolWrapper {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(fee0={}, fee1={})@{}", self.get_name(), self.fee0, self.fee1, self.get_pool_id())
    }
}

impl Debug for PoolWrapper {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(fee0={}, fee1={})@{:?}", self.get_name(), self.fee0, self.fee1, self.get_pool_id())
    }
}

impl Hash for PoolWrapper {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.get_pool_id().hash(state)
    }
}

impl PartialEq for PoolWrapper {
    fn eq(&self, other: &Self) -> bool {
        self.pool.get_pool_id() == other.pool.get_pool_id()
    }
}

impl PoolWrapper {
    pub fn new(pool: Arc<Pool>) -> Self {
        PoolWrapper { pool }
    }
}

impl Clone for PoolWrapper {
    fn clone(&self) -> Self {
        Self { pool: self.pool.clone() }
    }
}

impl Deref for PoolWrapper {
    type Target = Pool;

    fn deref(&self) -> &Self::Target {
        self.pool.deref()
    }
}

impl From<Pool> for PoolWrapper {
    fn from(pool: Pool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::logic::pools::UpdateOutcome;

    fn tokens() -> (Arc<Token>, Arc<Token>) {
        (Arc::new(Token::repeat_byte(1)), Arc::new(Token::repeat_byte(2)))
    }

    #[test]
    fn test_identical_tokens_rejected() {
        let token = Arc::new(Token::repeat_byte(1));
        let pool = Pool::new(Address::repeat_byte(10), token.clone(), token, Fee::default());
        assert!(pool.is_err());
    }

    #[test]
    fn test_pool_wrapper_identity() -> eyre::Result<()> {
        let (token0, token1) = tokens();
        let pool = PoolWrapper::from(Pool::new(Address::repeat_byte(10), token0.clone(), token1.clone(), Fee::default())?);
        let same_address = PoolWrapper::from(Pool::new(Address::repeat_byte(10), token1, token0, Fee::ZERO)?);

        assert_eq!(pool.get_pool_id(), PoolId::Address(Address::repeat_byte(10)));
        assert_eq!(pool, same_address);
        Ok(())
    }

    #[test]
    fn test_snapshot_reflects_applied_reserves() -> eyre::Result<()> {
        let (token0, token1) = tokens();
        let pool = Pool::new(Address::repeat_byte(10), token0, token1, Fee::default())?
            .with_reserves(U256::from(10), U256::from(20));

        assert_eq!(pool.get_reserves(), (U256::from(10), U256::from(20)));
        assert_eq!(pool.apply_reserves(U256::from(11), U256::from(21), 3)?, UpdateOutcome::Changed);

        let state = pool.snapshot();
        assert_eq!((state.reserve0, state.reserve1), (U256::from(11), U256::from(21)));
        assert_eq!(state.token0, Address::repeat_byte(1));
        assert_eq!(pool.last_block(), Some(3));
        assert_eq!(state.last_block, Some(3));
        Ok(())
    }

    #[test]
    fn test_other_token_and_name() -> eyre::Result<()> {
        let (token0, token1) = tokens();
        let pool = Pool::new(Address::repeat_byte(10), token0.clone(), token1.clone(), Fee::default())?;

        assert_eq!(pool.get_other_token(&token0.get_address()), Some(&token1));
        assert_eq!(pool.get_other_token(&Address::repeat_byte(3)), None);
        assert_eq!(pool.get_name(), format!("{}-{}", token0.get_symbol(), token1.get_symbol()));
        assert_eq!(pool.with_name("SushiSwap").get_name(), "SushiSwap");
        Ok(())
    }
}
