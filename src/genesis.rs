use crate::error::TokenError;
use crate::keeper::Keeper;
use crate::ledger::CoinLedger;
use crate::storage_traits::RecordStore;
use crate::token::BrandedToken;
use num_traits::Signed;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Registry contents at chain start, and what an export writes back out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    #[serde(default)]
    pub tokens: Vec<BrandedToken>,
}

impl GenesisState {
    pub fn new(tokens: Vec<BrandedToken>) -> Self {
        Self { tokens }
    }

    /// Check every token is well formed and no two share a slug
    pub fn validate(&self) -> Result<(), TokenError> {
        let mut seen = HashSet::new();

        for token in &self.tokens {
            let token_slug = token.slug();
            if token_slug.is_empty() {
                return Err(TokenError::Validation(format!(
                    "genesis token `{}` has no usable name",
                    token.name
                )));
            }
            if token.owner.is_empty() {
                return Err(TokenError::Validation(format!(
                    "genesis token `{}` has no owner",
                    token.name
                )));
            }
            if token.amount.is_negative() {
                return Err(TokenError::Validation(format!(
                    "genesis token `{}` has negative supply {}",
                    token.name, token.amount
                )));
            }
            if !seen.insert(token_slug.clone()) {
                return Err(TokenError::AlreadyExists(token_slug));
            }
        }

        Ok(())
    }
}

/// Load a validated genesis state into the registry
///
/// Only registry records are written. Balances are part of the coin ledger's
/// own genesis and are expected to already match.
pub fn init_genesis<S: RecordStore, L: CoinLedger>(
    keeper: &mut Keeper<S, L>,
    state: &GenesisState,
) -> Result<(), TokenError> {
    state.validate()?;

    for token in &state.tokens {
        keeper.set(&token.slug(), token)?;
    }

    log::info!(
        target: keeper.log_target(),
        "initialized {} branded tokens from genesis",
        state.tokens.len()
    );
    Ok(())
}

/// Dump every registered token, in slug order
pub fn export_genesis<S: RecordStore, L: CoinLedger>(
    keeper: &Keeper<S, L>,
) -> Result<GenesisState, TokenError> {
    let tokens = keeper
        .iter()
        .map(|entry| entry.map(|(_, token)| token))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(GenesisState { tokens })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::AccountAddress;
    use crate::config::ModuleConfig;
    use crate::ledger::InMemoryCoinLedger;
    use crate::storage::MemoryStore;
    use num_bigint::BigInt;

    fn token(name: &str, amount: i64) -> BrandedToken {
        BrandedToken::new(name, BigInt::from(amount), AccountAddress::derive(name.as_bytes()))
    }

    #[test]
    fn test_default_is_empty_and_valid() {
        let state = GenesisState::default();
        assert!(state.tokens.is_empty());
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_tokens() {
        let dup = GenesisState::new(vec![token("Brand", 1), token("brand", 2)]);
        assert!(matches!(dup.validate(), Err(TokenError::AlreadyExists(_))));

        let negative = GenesisState::new(vec![token("brand", -1)]);
        assert!(matches!(negative.validate(), Err(TokenError::Validation(_))));

        let ownerless = GenesisState::new(vec![BrandedToken::new(
            "brand",
            BigInt::from(1),
            AccountAddress::default(),
        )]);
        assert!(matches!(ownerless.validate(), Err(TokenError::Validation(_))));

        let nameless = GenesisState::new(vec![token("???", 1)]);
        assert!(matches!(nameless.validate(), Err(TokenError::Validation(_))));
    }

    #[test]
    fn test_init_then_export() {
        let mut keeper = Keeper::new(
            MemoryStore::new(),
            InMemoryCoinLedger::new(),
            ModuleConfig::default(),
        );
        let state = GenesisState::new(vec![token("Zed", 3), token("Alpha", 1)]);

        init_genesis(&mut keeper, &state).unwrap();
        let exported = export_genesis(&keeper).unwrap();

        let names: Vec<&str> = exported.tokens.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Zed"]);
    }

    #[test]
    fn test_init_rejects_invalid_state_without_writing() {
        let mut keeper = Keeper::new(
            MemoryStore::new(),
            InMemoryCoinLedger::new(),
            ModuleConfig::default(),
        );
        let state = GenesisState::new(vec![token("ok", 1), token("OK", 1)]);

        assert!(init_genesis(&mut keeper, &state).is_err());
        assert!(keeper.store().is_empty().unwrap());
    }

    #[test]
    fn test_json_shape() {
        let state: GenesisState = serde_json::from_str("{}").unwrap();
        assert_eq!(state, GenesisState::default());
    }
}
