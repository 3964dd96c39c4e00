//! # Transaction Builder
//!
//! Turns a [`CommandDraft`] plus session context into a validated [`Command`].
//! Nothing here signs or talks to the network; a rejected draft never
//! reaches the queue.

use std::collections::BTreeSet;

use crate::algorithms::{parse_amount, require_non_empty};
use crate::config::ChannelConfig;
use crate::domain::{
    AddInventory, AddProducts, AddSeller, Amount, BuildContext, ChannelError, Command,
    CommandDraft, CreateSalesChannel, MoveInventory, ProductInput, Sale, SaleLine,
};

/// Builds commands from raw user input.
#[derive(Clone, Debug)]
pub struct TransactionBuilder {
    start_snapshot_ordinal: u64,
    end_snapshot_ordinal: u64,
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self::from_config(&ChannelConfig::default())
    }
}

impl TransactionBuilder {
    /// Builder stamping new channels with the given ordinal window.
    pub fn new(start_snapshot_ordinal: u64, end_snapshot_ordinal: u64) -> Self {
        Self {
            start_snapshot_ordinal,
            end_snapshot_ordinal,
        }
    }

    pub fn from_config(config: &ChannelConfig) -> Self {
        Self::new(config.start_snapshot_ordinal, config.end_snapshot_ordinal)
    }

    /// Validate `draft` and shape it into a command.
    pub fn build(&self, draft: CommandDraft, context: &BuildContext) -> Result<Command, ChannelError> {
        let address = require_non_empty("address", &context.address)?;
        let channel_id = || -> Result<String, ChannelError> {
            require_non_empty("channel_id", context.channel_id.as_deref().unwrap_or_default())
        };

        let command = match draft {
            CommandDraft::CreateSalesChannel { name, products } => {
                Command::CreateSalesChannel(CreateSalesChannel {
                    name: require_non_empty("name", &name)?,
                    owner: address,
                    products: catalog(&products)?,
                    start_snapshot_ordinal: self.start_snapshot_ordinal,
                    end_snapshot_ordinal: self.end_snapshot_ordinal,
                })
            }
            CommandDraft::AddInventory { product, amount } => Command::AddInventory(AddInventory {
                channel_id: channel_id()?,
                address,
                product: require_non_empty("product", &product)?,
                amount: parse_amount("amount", &amount)?,
                timestamp: context.timestamp,
            }),
            CommandDraft::MoveInventory {
                to_address,
                product,
                amount,
            } => {
                let to_address = require_non_empty("to_address", &to_address)?;
                if to_address == address {
                    return Err(ChannelError::invalid(
                        "to_address",
                        "cannot move inventory to yourself",
                    ));
                }
                Command::MoveInventory(MoveInventory {
                    channel_id: channel_id()?,
                    address,
                    to_address,
                    product: require_non_empty("product", &product)?,
                    amount: parse_amount("amount", &amount)?,
                    timestamp: context.timestamp,
                })
            }
            CommandDraft::AddSeller { seller } => Command::AddSeller(AddSeller {
                channel_id: channel_id()?,
                address,
                seller: require_non_empty("seller", &seller)?,
            }),
            CommandDraft::AddProducts { products } => Command::AddProducts(AddProducts {
                channel_id: channel_id()?,
                address,
                products: catalog(&products)?,
            }),
            CommandDraft::Sale {
                lines,
                payment,
                station,
            } => Command::Sale(Sale {
                channel_id: channel_id()?,
                address,
                station: station
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty()),
                sale: sale_lines(&lines)?,
                payment: require_non_empty("payment", &payment)?,
                timestamp: context.timestamp,
            }),
        };

        Ok(command)
    }
}

fn catalog(products: &[ProductInput]) -> Result<Vec<(String, Amount)>, ChannelError> {
    if products.is_empty() {
        return Err(ChannelError::invalid("products", "at least one product is required"));
    }

    let mut seen = BTreeSet::new();
    products
        .iter()
        .map(|input| {
            let name = require_non_empty("product", &input.name)?;
            if !seen.insert(name.clone()) {
                return Err(ChannelError::invalid(
                    "products",
                    format!("duplicate product {name:?}"),
                ));
            }
            Ok((name, parse_amount("price", &input.price)?))
        })
        .collect()
}

fn sale_lines(lines: &[SaleLine]) -> Result<Vec<(String, u64)>, ChannelError> {
    let mut seen = BTreeSet::new();
    let sale = lines
        .iter()
        .map(|line| {
            let product = require_non_empty("product", &line.product)?;
            if !seen.insert(product.clone()) {
                return Err(ChannelError::invalid(
                    "sale",
                    format!("duplicate product {product:?}"),
                ));
            }
            Ok((product, line.count))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if sale.iter().all(|(_, count)| *count == 0) {
        return Err(ChannelError::invalid("sale", "no items sold"));
    }
    Ok(sale)
}
