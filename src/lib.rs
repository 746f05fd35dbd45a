pub mod address;
pub mod config;
pub mod error;
pub mod events;
pub mod genesis;
pub mod handler;
pub mod keeper;
pub mod ledger;
pub mod msgs;
pub mod querier;
pub mod slug;
pub mod storage;
pub mod storage_traits;
pub mod token;

// Re-export the main types for convenience
pub use address::AccountAddress;
pub use config::{ModuleConfig, StoreConfig};
pub use error::{LedgerError, StorageError, TokenError};
pub use events::{Event, EventManager};
pub use genesis::{export_genesis, init_genesis, GenesisState};
pub use handler::{handle, HandlerResult};
pub use keeper::{Keeper, TokenIterator};
pub use ledger::{Coin, CoinLedger, Coins, InMemoryCoinLedger};
pub use msgs::{
    Msg,
    MsgBurnBrandedToken,
    MsgCreateBrandedToken,
    MsgMintBrandedToken,
    MsgTransferBrandedTokenOwnership,
    TokenMsg,
};
pub use querier::query;
pub use storage_traits::{Record, RecordIterator, RecordStore};
pub use token::BrandedToken;

// Re-export the storage implementations
pub use storage::MemoryStore;

#[cfg(feature = "rocksdb")]
pub use storage::RocksDbStore;

#[cfg(feature = "sqlite")]
pub use storage::SqliteStore;
