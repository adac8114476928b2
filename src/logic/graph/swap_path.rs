use crate::{PoolId, PoolWrapper, Token};
use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use sha2::digest::Update;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt::{Debug, Display};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Stable sha256 over the token and pool addresses of a path.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SwapPathHash(pub B256);

impl Display for SwapPathHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for SwapPathHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SwapPathHash({})", self.0)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("swap path has no pools")]
    Empty,
    #[error("swap path needs one more token than pools, got {tokens} tokens for {pools} pools")]
    TokenCountMismatch { tokens: usize, pools: usize },
    #[error("hop {hop}: pool {pool} does not connect {token_in} to {token_out}")]
    HopDiscontinuity { hop: usize, pool: PoolId, token_in: Address, token_out: Address },
}

/// A fixed linear route: `tokens[i] -> tokens[i + 1]` through `pools[i]`.
///
/// The pools keep mutating their reserves on their own, the route itself never changes.
#[derive(Clone, Debug, Eq)]
pub struct SwapPath {
    // hash of the path, used to identify it in logs
    pub swap_path_hash: SwapPathHash,
    // internal lookup for faster contains_pool
    pub pools_map: HashSet<PoolId>,
    // The tokens of the path e.g. token0 -> token1 -> token2
    pub tokens: Vec<Arc<Token>>,
    // The pools of the path e.g. pool0 -> pool1
    pub pools: Vec<PoolWrapper>,
}

impl Display for SwapPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SwapPath(pools={:?}, tokens={:?})",
            self.pools.iter().map(|p| p.get_name()).collect::<Vec<String>>(),
            self.tokens.iter().map(|t| t.get_symbol()).collect::<Vec<String>>()
        )
    }
}

impl SwapPath {
    /// Create a swap path, checking that every pool connects its two neighbouring tokens.
    pub fn new<T: Into<Arc<Token>>, P: Into<PoolWrapper>>(tokens: Vec<T>, pools: Vec<P>) -> Result<Self, PathError> {
        let tokens: Vec<Arc<Token>> = tokens.into_iter().map(|t| t.into()).collect();
        let pools: Vec<PoolWrapper> = pools.into_iter().map(|p| p.into()).collect();

        if pools.is_empty() {
            return Err(PathError::Empty);
        }
        if tokens.len() != pools.len() + 1 {
            return Err(PathError::TokenCountMismatch { tokens: tokens.len(), pools: pools.len() });
        }
        for (hop, pool) in pools.iter().enumerate() {
            check_hop(hop, pool, &tokens[hop], &tokens[hop + 1])?;
        }

        let pools_map = pools.iter().map(|pool| pool.get_pool_id()).collect();
        let swap_path_hash = generate_swap_path_hash(&tokens, &pools);

        Ok(SwapPath { swap_path_hash, tokens, pools, pools_map })
    }

    /// Create a new swap path with only one hop
    pub fn new_first(token_from: Arc<Token>, token_to: Arc<Token>, pool: PoolWrapper) -> Result<Self, PathError> {
        Self::new(vec![token_from, token_to], vec![pool])
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty() && self.pools.is_empty()
    }

    pub fn tokens_count(&self) -> usize {
        self.tokens.len()
    }

    /// Check if the swap path contains a pool
    pub fn contains_pool(&self, pool_id: &PoolId) -> bool {
        self.pools_map.contains(pool_id)
    }

    /// The hop count of the swap path
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn first_token(&self) -> Option<&Arc<Token>> {
        self.tokens.first()
    }

    pub fn last_token(&self) -> Option<&Arc<Token>> {
        self.tokens.last()
    }
}

fn check_hop(hop: usize, pool: &PoolWrapper, token_in: &Token, token_out: &Token) -> Result<(), PathError> {
    let token_in = token_in.get_address();
    let token_out = token_out.get_address();
    if token_in == token_out || !pool.contains_token(&token_in) || !pool.contains_token(&token_out) {
        return Err(PathError::HopDiscontinuity { hop, pool: pool.get_pool_id(), token_in, token_out });
    }
    Ok(())
}

impl Hash for SwapPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tokens.hash(state);
        self.pools.hash(state);
    }
}

impl PartialEq for SwapPath {
    fn eq(&self, other: &Self) -> bool {
        self.tokens == other.tokens && self.pools == other.pools
    }
}

/// Hash all the addresses of the tokens and pools in the path to a sha256 hash.
pub fn generate_swap_path_hash(tokens: &[Arc<Token>], pools: &[PoolWrapper]) -> SwapPathHash {
    let mut hasher = Sha256::new();

    for token in tokens.iter() {
        Update::update(&mut hasher, token.get_address().as_slice());
    }
    for pool in pools.iter() {
        Update::update(&mut hasher, pool.get_address().as_slice());
    }

    let hash_slice: [u8; 32] = hasher.finalize().into();
    SwapPathHash(B256::from(hash_slice))
}
