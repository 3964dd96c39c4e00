//! # Ports Module
//!
//! Hexagonal architecture ports (inbound API + outbound dependencies).

pub mod inbound;
pub mod outbound;

pub use inbound::SalesChannelApi;
pub use outbound::{
    KeyValueStore, Keystore, LedgerGateway, MockTimeSource, SystemTimeSource, TimeSource,
};
