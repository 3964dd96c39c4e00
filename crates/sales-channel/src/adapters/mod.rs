//! # Adapters Module
//!
//! Implementations of the outbound ports.

pub mod http_ledger;
pub mod keystore;
pub mod mock_ledger;
pub mod store;

pub use http_ledger::HttpLedgerClient;
pub use keystore::{Secp256k1Keystore, WALLET_PRIVATE_KEY};
pub use mock_ledger::{FailurePredicate, MockLedger};
pub use store::{InMemoryStore, JsonFileStore};
