//! # Domain Entities
//!
//! The ledger-owned channel record and its local projections.

use super::errors::ChannelError;
use super::value_objects::{Address, ChannelId, Role, TimestampMillis};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Product name → unit price.
pub type ProductCatalog = BTreeMap<String, f64>;

/// Seller address → product → quantity on hand.
pub type InventoryLedger = BTreeMap<Address, BTreeMap<String, f64>>;

/// Timestamp (ms) → seller → product → units sold.
pub type SalesLedger = BTreeMap<TimestampMillis, BTreeMap<Address, BTreeMap<String, u64>>>;

/// A sales channel as served by the ledger.
///
/// Collections missing from (or `null` in) the snapshot default to empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// Ledger-assigned identifier. Never changes after creation.
    #[serde(default)]
    pub id: ChannelId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Creator's address.
    #[serde(default)]
    pub owner: Address,
    /// Catalog.
    #[serde(default, deserialize_with = "null_as_default")]
    pub products: ProductCatalog,
    /// Seller roster.
    #[serde(default, deserialize_with = "null_as_default")]
    pub sellers: Vec<Address>,
    /// Per-seller stock.
    #[serde(default, deserialize_with = "null_as_default")]
    pub inventory: InventoryLedger,
    /// Recorded sales.
    #[serde(default, deserialize_with = "null_as_default")]
    pub sales: SalesLedger,
}

/// A fetched snapshot is just a channel value.
pub type ChannelSnapshot = Channel;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Channel {
    /// Check the invariants a snapshot must satisfy before it is cached.
    pub fn validate(&self) -> Result<(), ChannelError> {
        if self.id.trim().is_empty() {
            return Err(ChannelError::MalformedResponse("channel id is empty".into()));
        }
        if self.owner.trim().is_empty() {
            return Err(ChannelError::MalformedResponse("channel owner is empty".into()));
        }
        if let Some((name, price)) = self
            .products
            .iter()
            .find(|(_, price)| !price.is_finite() || **price < 0.0)
        {
            return Err(ChannelError::MalformedResponse(format!(
                "product {name} has invalid price {price}"
            )));
        }
        Ok(())
    }

    /// Classify `address` against this channel.
    pub fn role_of(&self, address: &str) -> Role {
        if self.owner == address {
            Role::Owner
        } else if self.sellers.iter().any(|seller| seller == address) {
            Role::Seller
        } else {
            Role::NotAMember
        }
    }

    /// Roster without the owner, in ledger order.
    pub fn sellers_excluding_owner(&self) -> Vec<&Address> {
        self.sellers
            .iter()
            .filter(|seller| **seller != self.owner)
            .collect()
    }

    /// Catalog sorted by ascending price, ties broken by name.
    pub fn products_by_price(&self) -> Vec<(&str, f64)> {
        let mut products: Vec<(&str, f64)> = self
            .products
            .iter()
            .map(|(name, price)| (name.as_str(), *price))
            .collect();
        products.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        products
    }

    /// Quantity of `product` held by `address`.
    pub fn stock_of(&self, address: &str, product: &str) -> f64 {
        self.inventory
            .get(address)
            .and_then(|items| items.get(product))
            .copied()
            .unwrap_or(0.0)
    }
}

/// Outcome of a reconciliation.
#[derive(Clone, Debug, PartialEq)]
pub struct Reconciliation {
    /// Authoritative snapshot.
    pub channel: Channel,
    /// Caller's role in it.
    pub role: Role,
}

/// A cached channel projection and when it was fetched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CachedChannel {
    /// Snapshot as fetched.
    pub channel: Channel,
    /// Client time of the fetch (ms).
    pub fetched_at: TimestampMillis,
}
