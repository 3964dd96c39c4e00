//! # Sales Channel
//!
//! Client-side transaction pipeline for merchant sales channels recorded on a
//! Constellation metagraph.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Turn user intents (create a channel, stock it, add sellers, record sales)
//! into signed commands, deliver them to the ledger one at a time in order,
//! and reconcile the local view of a channel with the ledger's snapshot.
//!
//! ## Pipeline
//!
//! | Stage | Component |
//! |-------|-----------|
//! | Wallet key | [`IdentityProvider`] over a [`Keystore`] |
//! | Input validation | [`TransactionBuilder`] |
//! | Signing | [`ProofGenerator`] |
//! | Ordered delivery | [`SubmissionQueue`] |
//! | Wire transport | [`HttpLedgerClient`] |
//! | Read-back | [`StateReconciler`] |
//!
//! ## Module Structure
//!
//! ```text
//! sales-channel/
//! ├── domain/          # Commands, channels, submissions, errors
//! ├── algorithms/      # Canonical encoding, amount parsing, sales analytics
//! ├── ports/           # API trait (inbound) + dependency traits (outbound)
//! ├── application/     # Builder, queue, reconciler, SalesChannelService
//! ├── adapters/        # HTTP ledger, key-value stores, keystore, mock ledger
//! └── config.rs        # ChannelConfig
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{
    HttpLedgerClient, InMemoryStore, JsonFileStore, MockLedger, Secp256k1Keystore,
    WALLET_PRIVATE_KEY,
};
pub use algorithms::{
    canonical_bytes, parse_amount, sales_per_seller, signing_message, verify_proof, SalesSeries,
    SignedSubmission,
};
pub use application::{
    ChannelCache, ChannelPoller, IdentityProvider, PollUpdate, ProofGenerator,
    SalesChannelService, SessionStore, StateReconciler, SubmissionQueue, SubmissionTicket,
    TransactionBuilder,
};
pub use config::ChannelConfig;
pub use domain::{
    Address, Amount, BatchOutcome, BuildContext, Channel, ChannelError, ChannelId,
    ChannelSnapshot, Command, CommandDraft, CommandKind, Identity, InventoryInput, ProductInput,
    Proof, Reconciliation, Role, SaleLine, SubmissionId, SubmissionRecord, SubmissionState,
    TxHash,
};
pub use ports::{
    KeyValueStore, Keystore, LedgerGateway, MockTimeSource, SalesChannelApi, SystemTimeSource,
    TimeSource,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
