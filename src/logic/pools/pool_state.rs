use super::fee::Fee;
use crate::utils::math::{div_ceil, f64_to_u256, u256_to_f64};
use alloy_primitives::{Address, U256};
use strum_macros::Display;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CalculationError {
    #[error("token {0} is not held by the pool")]
    UnknownToken(Address),
    #[error("amount must be greater than zero")]
    ZeroAmount,
    #[error("insufficient liquidity: requested {requested}, reserve {available}")]
    InsufficientLiquidity { requested: U256, available: U256 },
    #[error("arithmetic overflow")]
    Overflow,
}

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash)]
#[strum(serialize_all = "snake_case")]
pub enum PoolSide {
    Token0,
    Token1,
}

impl PoolSide {
    pub fn opposite(&self) -> PoolSide {
        match self {
            PoolSide::Token0 => PoolSide::Token1,
            PoolSide::Token1 => PoolSide::Token0,
        }
    }

    /// `(amount0, amount1)` with `amount` on this side and zero on the other.
    pub fn split(&self, amount: U256) -> (U256, U256) {
        match self {
            PoolSide::Token0 => (amount, U256::ZERO),
            PoolSide::Token1 => (U256::ZERO, amount),
        }
    }
}

/// A consistent, owned view of one constant-product pool: identities, reserves and fees.
///
/// All pricing is exact integer arithmetic on the fee fraction. Outputs are floored and
/// required inputs are ceiled, so a quote never promises more than the pool can settle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolState {
    pub token0: Address,
    pub token1: Address,
    pub reserve0: U256,
    pub reserve1: U256,
    /// Fee charged when token0 is the input.
    pub fee0: Fee,
    /// Fee charged when token1 is the input.
    pub fee1: Fee,
    /// Block of the reserves, `None` until the first observation.
    pub last_block: Option<u64>,
}

impl PoolState {
    pub fn side_of(&self, token: &Address) -> Result<PoolSide, CalculationError> {
        if *token == self.token0 {
            Ok(PoolSide::Token0)
        } else if *token == self.token1 {
            Ok(PoolSide::Token1)
        } else {
            Err(CalculationError::UnknownToken(*token))
        }
    }

    pub fn token(&self, side: PoolSide) -> Address {
        match side {
            PoolSide::Token0 => self.token0,
            PoolSide::Token1 => self.token1,
        }
    }

    pub fn reserve(&self, side: PoolSide) -> U256 {
        match side {
            PoolSide::Token0 => self.reserve0,
            PoolSide::Token1 => self.reserve1,
        }
    }

    pub fn fee(&self, input_side: PoolSide) -> Fee {
        match input_side {
            PoolSide::Token0 => self.fee0,
            PoolSide::Token1 => self.fee1,
        }
    }

    pub fn other_token(&self, token: &Address) -> Result<Address, CalculationError> {
        Ok(self.token(self.side_of(token)?.opposite()))
    }

    pub fn reserve_of(&self, token: &Address) -> Result<U256, CalculationError> {
        Ok(self.reserve(self.side_of(token)?))
    }

    /// `floor(reserve_out * in * (1 - fee) / (reserve_in + in * (1 - fee)))`
    pub fn amount_out(&self, token_in: &Address, amount_in: U256) -> Result<U256, CalculationError> {
        let side_in = self.side_of(token_in)?;
        if amount_in.is_zero() {
            return Err(CalculationError::ZeroAmount);
        }

        let reserve_in = self.reserve(side_in);
        let reserve_out = self.reserve(side_in.opposite());
        let fee = self.fee(side_in);

        let amount_in_with_fee = amount_in.checked_mul(fee.retained()).ok_or(CalculationError::Overflow)?;
        let numerator = reserve_out.checked_mul(amount_in_with_fee).ok_or(CalculationError::Overflow)?;
        let denominator = reserve_in
            .checked_mul(fee.denominator())
            .and_then(|scaled| scaled.checked_add(amount_in_with_fee))
            .ok_or(CalculationError::Overflow)?;

        Ok(numerator / denominator)
    }

    /// `ceil(reserve_in * out / ((reserve_out - out) * (1 - fee)))`, the smallest input that
    /// buys `amount_out` of `token_out`.
    pub fn amount_in(&self, token_out: &Address, amount_out: U256) -> Result<U256, CalculationError> {
        let side_out = self.side_of(token_out)?;
        let side_in = side_out.opposite();

        let reserve_in = self.reserve(side_in);
        let reserve_out = self.reserve(side_out);
        if amount_out >= reserve_out {
            return Err(CalculationError::InsufficientLiquidity { requested: amount_out, available: reserve_out });
        }
        let fee = self.fee(side_in);

        let numerator = reserve_in
            .checked_mul(amount_out)
            .and_then(|v| v.checked_mul(fee.denominator()))
            .ok_or(CalculationError::Overflow)?;
        let denominator = (reserve_out - amount_out).checked_mul(fee.retained()).ok_or(CalculationError::Overflow)?;

        div_ceil(numerator, denominator).ok_or(CalculationError::Overflow)
    }

    /// Largest input of `token_in` whose marginal rate still pays at least `1 / ratio` of the
    /// output token per unit in, where `ratio` is raw `amount_in / amount_out`.
    ///
    /// Zero when the pool is already priced past the target or the ratio is not positive.
    pub fn max_amount_in_at_ratio(&self, token_in: &Address, ratio: f64) -> Result<U256, CalculationError> {
        let side_in = self.side_of(token_in)?;
        if !ratio.is_finite() || ratio <= 0.0 {
            return Ok(U256::ZERO);
        }

        let reserve_in = u256_to_f64(self.reserve(side_in));
        let reserve_out = u256_to_f64(self.reserve(side_in.opposite()));
        let retained = 1.0 - self.fee(side_in).as_f64();

        let max_in = ((retained * reserve_in * reserve_out * ratio).sqrt() - reserve_in) / retained;
        Ok(f64_to_u256(max_in.floor()))
    }
}
