use crate::error::TokenError;
use crate::keeper::Keeper;
use crate::ledger::CoinLedger;
use crate::slug;
use crate::storage_traits::RecordStore;
use crate::token::BrandedToken;
use num_bigint::BigInt;
use num_traits::Zero;
use serde::Serialize;

/// Query endpoints supported by the querier
pub const QUERY_LIST_BRANDED_TOKENS: &str = "list";
pub const QUERY_GET_BRANDED_TOKEN: &str = "get";
pub const QUERY_GET_TOTAL_SUPPLY: &str = "supply";

/// Fetch a single branded token by (unnormalized) name
pub fn get_token<S: RecordStore, L: CoinLedger>(
    keeper: &Keeper<S, L>,
    name: &str,
) -> Result<BrandedToken, TokenError> {
    let token_slug = slug::normalize(name);
    keeper
        .get(&token_slug)?
        .ok_or(TokenError::NotFound(token_slug))
}

/// Slugs of every registered branded token, in store order
pub fn list_tokens<S: RecordStore, L: CoinLedger>(
    keeper: &Keeper<S, L>,
) -> Result<Vec<String>, TokenError> {
    keeper.slugs().collect()
}

/// Sum of the supply of every registered branded token
pub fn total_supply<S: RecordStore, L: CoinLedger>(
    keeper: &Keeper<S, L>,
) -> Result<BigInt, TokenError> {
    let mut supply = BigInt::zero();
    for entry in keeper.iter() {
        let (_, token) = entry?;
        supply += token.amount;
    }
    Ok(supply)
}

/// Route a query by its path segments and answer with indented JSON
///
/// Paths are `get/<name>`, `list` and `supply`.
pub fn query<S: RecordStore, L: CoinLedger>(
    keeper: &Keeper<S, L>,
    path: &[&str],
) -> Result<Vec<u8>, TokenError> {
    match path.first().copied() {
        Some(QUERY_GET_BRANDED_TOKEN) => {
            let name = path.get(1).ok_or_else(|| {
                TokenError::Validation("missing branded token name in query path".to_string())
            })?;
            to_json(&get_token(keeper, name)?)
        }
        Some(QUERY_LIST_BRANDED_TOKENS) => to_json(&list_tokens(keeper)?),
        Some(QUERY_GET_TOTAL_SUPPLY) => to_json(&total_supply(keeper)?.to_string()),
        other => Err(TokenError::UnknownRequest(format!(
            "unknown {} query endpoint: {}",
            keeper.config().querier_route,
            other.unwrap_or("<empty>")
        ))),
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, TokenError> {
    Ok(serde_json::to_vec_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::AccountAddress;
    use crate::config::ModuleConfig;
    use crate::ledger::InMemoryCoinLedger;
    use crate::storage::MemoryStore;

    fn keeper_with(tokens: &[(&str, i64)]) -> Keeper<MemoryStore, InMemoryCoinLedger> {
        let mut keeper = Keeper::new(
            MemoryStore::new(),
            InMemoryCoinLedger::new(),
            ModuleConfig::default(),
        );
        for (name, amount) in tokens {
            let owner = AccountAddress::derive(b"owner");
            let token = BrandedToken::new(*name, BigInt::from(*amount), owner);
            keeper.set(&token.slug(), &token).unwrap();
        }
        keeper
    }

    #[test]
    fn test_get_token_normalizes_name() {
        let keeper = keeper_with(&[("Sand Coin", 5)]);

        let token = get_token(&keeper, "SAND coin").unwrap();
        assert_eq!(token.name, "Sand Coin");

        let err = get_token(&keeper, "other").unwrap_err();
        assert!(matches!(err, TokenError::NotFound(ref s) if s == "other"));
    }

    #[test]
    fn test_list_tokens_returns_slugs_in_order() {
        let keeper = keeper_with(&[("Zed", 1), ("Alpha Beta", 2)]);
        assert_eq!(list_tokens(&keeper).unwrap(), vec!["alpha-beta", "zed"]);
    }

    #[test]
    fn test_total_supply_starts_at_zero() {
        let keeper = keeper_with(&[]);
        assert_eq!(total_supply(&keeper).unwrap(), BigInt::zero());

        let keeper = keeper_with(&[("a", 10), ("b", 20)]);
        assert_eq!(total_supply(&keeper).unwrap(), BigInt::from(30));
    }

    #[test]
    fn test_total_supply_propagates_codec_errors() {
        let keeper = keeper_with(&[("a", 10)]);
        keeper.store().set(b"b", &[1]).unwrap();

        assert!(matches!(
            total_supply(&keeper).unwrap_err(),
            TokenError::Codec { .. }
        ));
    }

    #[test]
    fn test_query_routes() {
        let keeper = keeper_with(&[("a", 10), ("b", 20)]);

        let body = query(&keeper, &["get", "a"]).unwrap();
        let token: BrandedToken = serde_json::from_slice(&body).unwrap();
        assert_eq!(token.amount, BigInt::from(10));

        let body = query(&keeper, &["list"]).unwrap();
        let slugs: Vec<String> = serde_json::from_slice(&body).unwrap();
        assert_eq!(slugs, vec!["a", "b"]);

        let body = query(&keeper, &["supply"]).unwrap();
        let supply: String = serde_json::from_slice(&body).unwrap();
        assert_eq!(supply, "30");
    }

    #[test]
    fn test_query_errors() {
        let keeper = keeper_with(&[]);

        assert!(matches!(
            query(&keeper, &["get"]).unwrap_err(),
            TokenError::Validation(_)
        ));
        assert!(matches!(
            query(&keeper, &["get", "missing"]).unwrap_err(),
            TokenError::NotFound(_)
        ));
        assert!(matches!(
            query(&keeper, &["balance"]).unwrap_err(),
            TokenError::UnknownRequest(_)
        ));
        assert!(matches!(
            query(&keeper, &[]).unwrap_err(),
            TokenError::UnknownRequest(_)
        ));
    }
}
