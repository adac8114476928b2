use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PoolId {
    Address(Address),
}

impl PoolId {
    pub fn address(&self) -> Address {
        match self {
            PoolId::Address(address) => *address,
        }
    }
}

impl Display for PoolId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolId::Address(address) => write!(f, "{address}"),
        }
    }
}

impl From<Address> for PoolId {
    fn from(address: Address) -> Self {
        PoolId::Address(address)
    }
}
