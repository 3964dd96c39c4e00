//! # Commands
//!
//! The closed set of ledger writes, and the raw drafts they are built from.
//!
//! ## Wire Shape
//!
//! Commands serialize externally tagged, with fields in declaration order:
//!
//! ```text
//! {"AddSeller":{"channelId":"…","address":"DAG…","seller":"DAG…"}}
//! ```
//!
//! Field order is part of the signed bytes and must not be rearranged.

use super::value_objects::{Address, Amount, ChannelId, TimestampMillis};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A ledger write.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Create a channel owned by the signer.
    CreateSalesChannel(CreateSalesChannel),
    /// Add stock for the signer.
    AddInventory(AddInventory),
    /// Move stock from the signer to another seller.
    MoveInventory(MoveInventory),
    /// Add a seller to the roster.
    AddSeller(AddSeller),
    /// Extend the catalog.
    AddProducts(AddProducts),
    /// Record a sale.
    Sale(Sale),
}

/// `CreateSalesChannel` payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSalesChannel {
    pub name: String,
    pub owner: Address,
    pub products: Vec<(String, Amount)>,
    pub start_snapshot_ordinal: u64,
    pub end_snapshot_ordinal: u64,
}

/// `AddInventory` payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddInventory {
    pub channel_id: ChannelId,
    pub address: Address,
    pub product: String,
    pub amount: Amount,
    #[serde(with = "millis_string")]
    pub timestamp: TimestampMillis,
}

/// `MoveInventory` payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveInventory {
    pub channel_id: ChannelId,
    pub address: Address,
    pub to_address: Address,
    pub product: String,
    pub amount: Amount,
    #[serde(with = "millis_string")]
    pub timestamp: TimestampMillis,
}

/// `AddSeller` payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSeller {
    pub channel_id: ChannelId,
    pub address: Address,
    pub seller: Address,
}

/// `AddProducts` payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddProducts {
    pub channel_id: ChannelId,
    pub address: Address,
    pub products: Vec<(String, Amount)>,
}

/// `Sale` payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub channel_id: ChannelId,
    pub address: Address,
    /// Point-of-sale station label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station: Option<String>,
    pub sale: Vec<(String, u64)>,
    pub payment: String,
    #[serde(with = "millis_string")]
    pub timestamp: TimestampMillis,
}

/// Timestamps travel as decimal strings of epoch milliseconds.
mod millis_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(millis: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Command discriminant, for logging and metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandKind {
    CreateSalesChannel,
    AddInventory,
    MoveInventory,
    AddSeller,
    AddProducts,
    Sale,
}

impl CommandKind {
    /// Variant name as it appears on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            CommandKind::CreateSalesChannel => "CreateSalesChannel",
            CommandKind::AddInventory => "AddInventory",
            CommandKind::MoveInventory => "MoveInventory",
            CommandKind::AddSeller => "AddSeller",
            CommandKind::AddProducts => "AddProducts",
            CommandKind::Sale => "Sale",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Command {
    /// Discriminant of this command.
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::CreateSalesChannel(_) => CommandKind::CreateSalesChannel,
            Command::AddInventory(_) => CommandKind::AddInventory,
            Command::MoveInventory(_) => CommandKind::MoveInventory,
            Command::AddSeller(_) => CommandKind::AddSeller,
            Command::AddProducts(_) => CommandKind::AddProducts,
            Command::Sale(_) => CommandKind::Sale,
        }
    }

    /// Target channel. `None` for channel creation.
    pub fn channel_id(&self) -> Option<&str> {
        match self {
            Command::CreateSalesChannel(_) => None,
            Command::AddInventory(c) => Some(&c.channel_id),
            Command::MoveInventory(c) => Some(&c.channel_id),
            Command::AddSeller(c) => Some(&c.channel_id),
            Command::AddProducts(c) => Some(&c.channel_id),
            Command::Sale(c) => Some(&c.channel_id),
        }
    }

    /// Address of the acting wallet.
    pub fn actor(&self) -> &str {
        match self {
            Command::CreateSalesChannel(c) => &c.owner,
            Command::AddInventory(c) => &c.address,
            Command::MoveInventory(c) => &c.address,
            Command::AddSeller(c) => &c.address,
            Command::AddProducts(c) => &c.address,
            Command::Sale(c) => &c.address,
        }
    }
}

// =============================================================================
// Drafts (raw user input)
// =============================================================================

/// One catalog line as typed by the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductInput {
    pub name: String,
    pub price: String,
}

impl ProductInput {
    pub fn new(name: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
        }
    }
}

/// One inventory line as typed by the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InventoryInput {
    pub product: String,
    pub amount: String,
}

impl InventoryInput {
    pub fn new(product: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            amount: amount.into(),
        }
    }
}

/// One sale line: product and units sold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaleLine {
    pub product: String,
    pub count: u64,
}

impl SaleLine {
    pub fn new(product: impl Into<String>, count: u64) -> Self {
        Self {
            product: product.into(),
            count,
        }
    }
}

/// Unvalidated input for one operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandDraft {
    CreateSalesChannel {
        name: String,
        products: Vec<ProductInput>,
    },
    AddInventory {
        product: String,
        amount: String,
    },
    MoveInventory {
        to_address: String,
        product: String,
        amount: String,
    },
    AddSeller {
        seller: String,
    },
    AddProducts {
        products: Vec<ProductInput>,
    },
    Sale {
        lines: Vec<SaleLine>,
        payment: String,
        station: Option<String>,
    },
}

impl CommandDraft {
    /// Kind of command this draft builds.
    pub fn kind(&self) -> CommandKind {
        match self {
            CommandDraft::CreateSalesChannel { .. } => CommandKind::CreateSalesChannel,
            CommandDraft::AddInventory { .. } => CommandKind::AddInventory,
            CommandDraft::MoveInventory { .. } => CommandKind::MoveInventory,
            CommandDraft::AddSeller { .. } => CommandKind::AddSeller,
            CommandDraft::AddProducts { .. } => CommandKind::AddProducts,
            CommandDraft::Sale { .. } => CommandKind::Sale,
        }
    }
}

/// Session-supplied context for building a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildContext {
    /// Active channel; required by every command except creation.
    pub channel_id: Option<ChannelId>,
    /// Acting wallet address.
    pub address: Address,
    /// Client clock (ms).
    pub timestamp: TimestampMillis,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(v: f64) -> Amount {
        Amount::new(v).unwrap()
    }

    #[test]
    fn test_add_seller_wire_shape() {
        let command = Command::AddSeller(AddSeller {
            channel_id: "c1".into(),
            address: "DAG_A".into(),
            seller: "DAG_B".into(),
        });
        let json = serde_json::to_string(&command).unwrap();
        assert_eq!(
            json,
            r#"{"AddSeller":{"channelId":"c1","address":"DAG_A","seller":"DAG_B"}}"#
        );
    }

    #[test]
    fn test_create_channel_wire_shape() {
        let command = Command::CreateSalesChannel(CreateSalesChannel {
            name: "Market".into(),
            owner: "DAG_A".into(),
            products: vec![("tea".into(), amount(3.0)), ("cake".into(), amount(2.5))],
            start_snapshot_ordinal: 1,
            end_snapshot_ordinal: 10000,
        });
        let json = serde_json::to_string(&command).unwrap();
        assert_eq!(
            json,
            r#"{"CreateSalesChannel":{"name":"Market","owner":"DAG_A","products":[["tea",3],["cake",2.5]],"startSnapshotOrdinal":1,"endSnapshotOrdinal":10000}}"#
        );
    }

    #[test]
    fn test_timestamp_is_decimal_string() {
        let command = Command::AddInventory(AddInventory {
            channel_id: "c1".into(),
            address: "DAG_A".into(),
            product: "tea".into(),
            amount: amount(4.0),
            timestamp: 1_700_000_000_123,
        });
        let json = serde_json::to_string(&command).unwrap();
        assert!(json.ends_with(r#""amount":4,"timestamp":"1700000000123"}}"#));

        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(back, command);
    }

    #[test]
    fn test_sale_station_order_and_omission() {
        let mut sale = Sale {
            channel_id: "c1".into(),
            address: "DAG_A".into(),
            station: Some("one".into()),
            sale: vec![("tea".into(), 2)],
            payment: "cash".into(),
            timestamp: 5,
        };
        let with_station = serde_json::to_string(&Command::Sale(sale.clone())).unwrap();
        assert_eq!(
            with_station,
            r#"{"Sale":{"channelId":"c1","address":"DAG_A","station":"one","sale":[["tea",2]],"payment":"cash","timestamp":"5"}}"#
        );

        sale.station = None;
        let without = serde_json::to_string(&Command::Sale(sale)).unwrap();
        assert!(!without.contains("station"));
    }

    #[test]
    fn test_command_accessors() {
        let command = Command::MoveInventory(MoveInventory {
            channel_id: "c9".into(),
            address: "DAG_A".into(),
            to_address: "DAG_B".into(),
            product: "tea".into(),
            amount: amount(1.0),
            timestamp: 0,
        });
        assert_eq!(command.kind(), CommandKind::MoveInventory);
        assert_eq!(command.channel_id(), Some("c9"));
        assert_eq!(command.actor(), "DAG_A");
        assert_eq!(command.kind().to_string(), "MoveInventory");
    }
}
