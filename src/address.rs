use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::ops::Deref;

/// Number of bytes in a derived account address
pub const ADDRESS_LEN: usize = 20;

// AccountAddress identifies the principal that owns a branded token or holds coins.
// It is opaque to this crate and only ever compared by value.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountAddress(#[serde(with = "hex::serde")] Vec<u8>);

impl Deref for AccountAddress {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<u8>> for AccountAddress {
    fn from(bytes: Vec<u8>) -> Self {
        AccountAddress(bytes)
    }
}

impl AccountAddress {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        AccountAddress(bytes.into())
    }

    /// Derive a deterministic address from a seed
    pub fn derive(seed: &[u8]) -> Self {
        let mut hasher = Sha256::new();

        // Domain separator
        hasher.update(b"BRANDED_TOKEN_Account");
        hasher.update(seed);

        let digest = hasher.finalize();
        AccountAddress(digest[..ADDRESS_LEN].to_vec())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render the address with a human readable prefix, e.g. `sand1f3a0...`
    pub fn to_prefixed(&self, prefix: &str) -> String {
        format!("{}{}", prefix, hex::encode(&self.0))
    }

    /// Parse an address rendered by [`AccountAddress::to_prefixed`]
    pub fn from_prefixed(prefix: &str, value: &str) -> Result<Self, String> {
        let body = value
            .strip_prefix(prefix)
            .ok_or_else(|| format!("address `{}` does not start with `{}`", value, prefix))?;
        let bytes = hex::decode(body).map_err(|e| format!("invalid address `{}`: {}", value, e))?;
        Ok(AccountAddress(bytes))
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_is_deterministic() {
        let a = AccountAddress::derive(b"alice");
        let b = AccountAddress::derive(b"alice");
        let c = AccountAddress::derive(b"bob");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), ADDRESS_LEN);
    }

    #[test]
    fn test_default_is_empty() {
        assert!(AccountAddress::default().is_empty());
        assert!(!AccountAddress::derive(b"alice").is_empty());
    }

    #[test]
    fn test_prefixed_round_trip() {
        let addr = AccountAddress::derive(b"carol");
        let rendered = addr.to_prefixed("sand");

        assert!(rendered.starts_with("sand"));
        assert_eq!(AccountAddress::from_prefixed("sand", &rendered).unwrap(), addr);
        assert!(AccountAddress::from_prefixed("cosmos", &rendered).is_err());
        assert!(AccountAddress::from_prefixed("sand", "sandzz").is_err());
    }

    #[test]
    fn test_json_uses_hex() {
        let addr = AccountAddress::new(vec![0xab, 0x01]);
        assert_eq!(serde_json::to_string(&addr).unwrap(), "\"ab01\"");
    }
}
