//! Coin ledger collaborator.
//!
//! The registry keeps a shadow balance of every branded token's issued units
//! in an external fungible-coin ledger, under the token's own denomination.
//! The host supplies the real ledger through [`CoinLedger`];
//! [`InMemoryCoinLedger`] is a self-contained implementation for hosts that
//! have none and for tests.

use crate::address::AccountAddress;
use crate::error::LedgerError;
use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// An amount of a single denomination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    #[serde(with = "crate::token::decimal")]
    pub amount: BigInt,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: impl Into<BigInt>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.into(),
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// A set of coins sorted by denomination, without duplicates or zero entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coins(Vec<Coin>);

impl Coins {
    /// Build a coin set, rejecting negative amounts, empty or duplicate denominations
    pub fn new(coins: Vec<Coin>) -> Result<Self, LedgerError> {
        let mut sorted: BTreeMap<String, BigInt> = BTreeMap::new();

        for coin in coins {
            if coin.denom.is_empty() {
                return Err(LedgerError::InvalidCoins("empty denomination".to_string()));
            }
            if coin.amount.is_negative() {
                return Err(LedgerError::InvalidCoins(format!("negative amount {}", coin)));
            }
            if sorted.contains_key(&coin.denom) {
                return Err(LedgerError::InvalidCoins(format!(
                    "duplicate denomination {}",
                    coin.denom
                )));
            }
            sorted.insert(coin.denom, coin.amount);
        }

        Ok(Coins(
            sorted
                .into_iter()
                .filter(|(_, amount)| !amount.is_zero())
                .map(|(denom, amount)| Coin { denom, amount })
                .collect(),
        ))
    }

    /// A coin set holding a single denomination
    pub fn single(
        denom: impl Into<String>,
        amount: impl Into<BigInt>,
    ) -> Result<Self, LedgerError> {
        Coins::new(vec![Coin::new(denom, amount)])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coin> {
        self.0.iter()
    }

    pub fn amount_of(&self, denom: &str) -> BigInt {
        self.0
            .iter()
            .find(|coin| coin.denom == denom)
            .map(|coin| coin.amount.clone())
            .unwrap_or_else(BigInt::zero)
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(Coin::to_string).collect();
        write!(f, "{}", rendered.join(","))
    }
}

/// External balance-accounting collaborator
pub trait CoinLedger {
    /// Credit coins to an account
    fn add_coins(&mut self, address: &AccountAddress, coins: &Coins) -> Result<(), LedgerError>;

    /// Debit coins from an account
    ///
    /// Fails without effect when any balance would go negative.
    fn subtract_coins(
        &mut self,
        address: &AccountAddress,
        coins: &Coins,
    ) -> Result<(), LedgerError>;

    /// Current balance of one denomination for an account
    fn balance(&self, address: &AccountAddress, denom: &str) -> BigInt;
}

impl<L: CoinLedger + ?Sized> CoinLedger for Box<L> {
    fn add_coins(&mut self, address: &AccountAddress, coins: &Coins) -> Result<(), LedgerError> {
        (**self).add_coins(address, coins)
    }

    fn subtract_coins(
        &mut self,
        address: &AccountAddress,
        coins: &Coins,
    ) -> Result<(), LedgerError> {
        (**self).subtract_coins(address, coins)
    }

    fn balance(&self, address: &AccountAddress, denom: &str) -> BigInt {
        (**self).balance(address, denom)
    }
}

/// Balances held in process memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryCoinLedger {
    balances: HashMap<AccountAddress, BTreeMap<String, BigInt>>,
}

impl InMemoryCoinLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all balances held in one denomination
    pub fn supply_of(&self, denom: &str) -> BigInt {
        self.balances
            .values()
            .filter_map(|account| account.get(denom))
            .fold(BigInt::zero(), |acc, amount| acc + amount)
    }
}

impl CoinLedger for InMemoryCoinLedger {
    fn add_coins(&mut self, address: &AccountAddress, coins: &Coins) -> Result<(), LedgerError> {
        if address.is_empty() {
            return Err(LedgerError::Rejected("cannot credit an empty address".to_string()));
        }

        let account = self.balances.entry(address.clone()).or_default();
        for coin in coins.iter() {
            *account.entry(coin.denom.clone()).or_insert_with(BigInt::zero) += &coin.amount;
        }
        Ok(())
    }

    fn subtract_coins(
        &mut self,
        address: &AccountAddress,
        coins: &Coins,
    ) -> Result<(), LedgerError> {
        // Check every denomination before touching any balance
        for coin in coins.iter() {
            let available = self.balance(address, &coin.denom);
            if available < coin.amount {
                return Err(LedgerError::InsufficientFunds {
                    address: address.to_string(),
                    denom: coin.denom.clone(),
                    available: available.to_string(),
                    requested: coin.amount.to_string(),
                });
            }
        }

        if let Some(account) = self.balances.get_mut(address) {
            for coin in coins.iter() {
                if let Some(balance) = account.get_mut(&coin.denom) {
                    *balance -= &coin.amount;
                    if balance.is_zero() {
                        account.remove(&coin.denom);
                    }
                }
            }
        }
        Ok(())
    }

    fn balance(&self, address: &AccountAddress, denom: &str) -> BigInt {
        self.balances
            .get(address)
            .and_then(|account| account.get(denom))
            .cloned()
            .unwrap_or_else(BigInt::zero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coins_are_sorted_and_skip_zero() {
        let coins = Coins::new(vec![
            Coin::new("zed", 5),
            Coin::new("alpha", 3),
            Coin::new("empty", 0),
        ])
        .unwrap();

        let denoms: Vec<&str> = coins.iter().map(|c| c.denom.as_str()).collect();
        assert_eq!(denoms, vec!["alpha", "zed"]);
        assert_eq!(coins.to_string(), "3alpha,5zed");
        assert_eq!(coins.amount_of("empty"), BigInt::zero());
    }

    #[test]
    fn test_coins_reject_invalid_entries() {
        assert!(Coins::single("brand", -1).is_err());
        assert!(Coins::single("", 1).is_err());
        assert!(Coins::new(vec![Coin::new("a", 1), Coin::new("a", 2)]).is_err());
        assert!(Coins::single("brand", 0).unwrap().is_empty());
    }

    #[test]
    fn test_credit_and_debit() {
        let mut ledger = InMemoryCoinLedger::new();
        let alice = AccountAddress::derive(b"alice");

        ledger.add_coins(&alice, &Coins::single("brand", 10).unwrap()).unwrap();
        assert_eq!(ledger.balance(&alice, "brand"), BigInt::from(10));

        ledger
            .subtract_coins(&alice, &Coins::single("brand", 4).unwrap())
            .unwrap();
        assert_eq!(ledger.balance(&alice, "brand"), BigInt::from(6));
        assert_eq!(ledger.supply_of("brand"), BigInt::from(6));
    }

    #[test]
    fn test_overdraft_is_rejected_without_effect() {
        let mut ledger = InMemoryCoinLedger::new();
        let alice = AccountAddress::derive(b"alice");
        ledger
            .add_coins(
                &alice,
                &Coins::new(vec![Coin::new("a", 5), Coin::new("b", 1)]).unwrap(),
            )
            .unwrap();

        let err = ledger
            .subtract_coins(
                &alice,
                &Coins::new(vec![Coin::new("a", 2), Coin::new("b", 2)]).unwrap(),
            )
            .unwrap_err();

        assert!(matches!(err, LedgerError::InsufficientFunds { ref denom, .. } if denom == "b"));
        assert_eq!(ledger.balance(&alice, "a"), BigInt::from(5));
        assert_eq!(ledger.balance(&alice, "b"), BigInt::from(1));
    }

    #[test]
    fn test_empty_address_cannot_be_credited() {
        let mut ledger = InMemoryCoinLedger::new();
        let result = ledger.add_coins(&AccountAddress::default(), &Coins::single("x", 1).unwrap());
        assert!(result.is_err());
    }
}
