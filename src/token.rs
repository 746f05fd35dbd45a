use crate::address::AccountAddress;
use crate::slug;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named, owned, supply-tracked unit of account layered on top of the coin ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandedToken {
    /// Denomination used for this token in the coin ledger. Never changes after creation.
    pub name: String,

    /// Total issued supply as tracked by the registry
    #[serde(with = "decimal")]
    pub amount: BigInt,

    /// The only account allowed to transfer, mint or burn this token
    pub owner: AccountAddress,
}

impl BrandedToken {
    pub fn new(name: impl Into<String>, amount: BigInt, owner: AccountAddress) -> Self {
        Self {
            name: name.into(),
            amount,
            owner,
        }
    }

    /// Storage key of this token
    pub fn slug(&self) -> String {
        slug::normalize(&self.name)
    }

    pub fn is_owned_by(&self, address: &AccountAddress) -> bool {
        &self.owner == address
    }

    /// Encode the token for the record store
    pub fn encode(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Decode a token read back from the record store
    pub fn decode(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}

impl fmt::Display for BrandedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Name: {}|Owner: {}|TotalSupply: {}",
            self.name, self.owner, self.amount
        )
    }
}

/// Serde adapter that writes arbitrary-precision integers as decimal strings
pub(crate) mod decimal {
    use num_bigint::BigInt;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigInt, D::Error> {
        let raw = String::deserialize(deserializer)?;
        BigInt::from_str(&raw)
            .map_err(|e| D::Error::custom(format!("invalid amount `{}`: {}", raw, e)))
    }
}
