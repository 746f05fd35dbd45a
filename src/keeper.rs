use crate::config::ModuleConfig;
use crate::error::TokenError;
use crate::ledger::CoinLedger;
use crate::storage_traits::{RecordIterator, RecordStore};
use crate::token::BrandedToken;

/// Keeper of the branded token registry
///
/// The keeper is the only writer of the record store for this module and owns
/// the handle on the coin ledger used to mirror issued balances. It knows
/// nothing about commands: existence and ownership rules live in the handler.
pub struct Keeper<S, L> {
    store: S,
    ledger: L,
    config: ModuleConfig,
    log_target: String,
}

impl<S: RecordStore, L: CoinLedger> Keeper<S, L> {
    pub fn new(store: S, ledger: L, config: ModuleConfig) -> Self {
        let log_target = config.log_target();
        Self {
            store,
            ledger,
            config,
            log_target,
        }
    }

    pub fn config(&self) -> &ModuleConfig {
        &self.config
    }

    /// Logging target for this module
    pub fn log_target(&self) -> &str {
        &self.log_target
    }

    /// Direct store access for tests that plant raw records
    #[cfg(test)]
    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    /// Fetch a branded token by slug
    ///
    /// A missing slug is `Ok(None)`, never an error. Bytes that fail to
    /// decode surface as [`TokenError::Codec`].
    pub fn get(&self, slug: &str) -> Result<Option<BrandedToken>, TokenError> {
        let bytes = match self.store.get(slug.as_bytes())? {
            Some(bytes) => bytes,
            None => {
                log::debug!(target: self.log_target.as_str(), "branded token {} not found", slug);
                return Ok(None);
            }
        };

        let token = BrandedToken::decode(&bytes).map_err(|e| TokenError::Codec {
            slug: slug.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(token))
    }

    pub fn has(&self, slug: &str) -> Result<bool, TokenError> {
        Ok(self.store.has(slug.as_bytes())?)
    }

    /// Insert or overwrite the record stored under `slug`
    ///
    /// Writes need a unique borrow, so code holding only `&Keeper` cannot
    /// change the registry:
    ///
    /// ```compile_fail
    /// use branded_tokens::{InMemoryCoinLedger, Keeper, MemoryStore};
    ///
    /// fn read_side(keeper: &Keeper<MemoryStore, InMemoryCoinLedger>) {
    ///     keeper.delete("brand").unwrap();
    /// }
    /// ```
    pub fn set(&mut self, slug: &str, token: &BrandedToken) -> Result<(), TokenError> {
        let bytes = token.encode().map_err(|e| TokenError::Codec {
            slug: slug.to_string(),
            reason: e.to_string(),
        })?;
        self.store.set(slug.as_bytes(), &bytes)?;
        log::debug!(target: self.log_target.as_str(), "stored branded token {} ({})", slug, token);
        Ok(())
    }

    /// Remove the record stored under `slug`
    pub fn delete(&mut self, slug: &str) -> Result<(), TokenError> {
        self.store.delete(slug.as_bytes())?;
        log::debug!(target: self.log_target.as_str(), "deleted branded token {}", slug);
        Ok(())
    }

    /// Iterate over every stored token in slug order
    pub fn iter(&self) -> TokenIterator<'_> {
        TokenIterator {
            inner: self.store.scan(),
        }
    }

    /// Slugs of every stored token in order, without decoding the records
    pub fn slugs(&self) -> impl Iterator<Item = Result<String, TokenError>> + '_ {
        self.store
            .scan()
            .map(|record| record.map_err(TokenError::from).and_then(|(key, _)| slug_from_key(key)))
    }
}

fn slug_from_key(key: Vec<u8>) -> Result<String, TokenError> {
    String::from_utf8(key).map_err(|e| TokenError::Codec {
        slug: String::from_utf8_lossy(e.as_bytes()).into_owned(),
        reason: "record key is not valid UTF-8".to_string(),
    })
}

/// Lazy pass over the registry yielding `(slug, token)` pairs
pub struct TokenIterator<'a> {
    inner: Box<dyn RecordIterator + 'a>,
}

impl Iterator for TokenIterator<'_> {
    type Item = Result<(String, BrandedToken), TokenError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (key, value) = match self.inner.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e.into())),
        };

        let slug = match slug_from_key(key) {
            Ok(slug) => slug,
            Err(e) => return Some(Err(e)),
        };

        Some(
            BrandedToken::decode(&value)
                .map(|token| (slug.clone(), token))
                .map_err(|e| TokenError::Codec {
                    slug,
                    reason: e.to_string(),
                }),
        )
    }
}
