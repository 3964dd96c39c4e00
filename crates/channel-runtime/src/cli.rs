//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sales_channel::ChannelConfig;

/// channel-runtime: sales channel client
#[derive(Parser, Debug)]
#[command(name = "channel-runtime", version)]
#[command(about = "Create, stock and reconcile sales channels on a metagraph ledger")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags shared by every subcommand. Each overrides its `SC_*` variable.
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Snapshot read endpoint (SC_L0_URL)
    #[arg(long, global = true)]
    pub l0_url: Option<String>,

    /// Data write endpoint (SC_DATA_L1_URL)
    #[arg(long, global = true)]
    pub data_l1_url: Option<String>,

    /// Local store file holding the wallet key and session (SC_STORE_PATH)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Log level or filter directive (SC_LOG_LEVEL)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit JSON log lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

impl GlobalArgs {
    /// Environment configuration with flags applied on top.
    pub fn channel_config(&self) -> ChannelConfig {
        let mut config = ChannelConfig::from_env();
        if let Some(url) = &self.l0_url {
            config.l0_url = url.clone();
        }
        if let Some(url) = &self.data_l1_url {
            config.data_l1_url = url.clone();
        }
        if let Some(path) = &self.store {
            config.store_path = path.clone();
        }
        config
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(flatten)]
    Channel(ChannelCommand),

    /// Print this process's Prometheus metrics
    Metrics,
}

/// Subcommands that run against the store and ledger.
#[derive(Subcommand, Debug)]
pub enum ChannelCommand {
    /// Show (creating if needed) the local wallet identity
    Identity,

    /// Create a channel owned by the local wallet
    CreateChannel {
        /// Channel name
        #[arg(long)]
        name: String,

        /// Catalog entry as NAME=PRICE (repeatable)
        #[arg(long = "product", value_name = "NAME=PRICE", required = true)]
        products: Vec<String>,
    },

    /// Add stock to the active channel, one submission per line
    AddInventory {
        /// Stock line as PRODUCT=AMOUNT (repeatable)
        #[arg(long = "item", value_name = "PRODUCT=AMOUNT", required = true)]
        items: Vec<String>,
    },

    /// Move stock from the local wallet to another seller
    MoveInventory {
        /// Receiving seller address
        #[arg(long)]
        to: String,

        #[arg(long)]
        product: String,

        #[arg(long)]
        amount: String,
    },

    /// Add sellers to the active channel
    AddSellers {
        /// Seller DAG addresses
        #[arg(required = true)]
        sellers: Vec<String>,
    },

    /// Extend the active channel's catalog
    AddProducts {
        /// Catalog entry as NAME=PRICE (repeatable)
        #[arg(long = "product", value_name = "NAME=PRICE", required = true)]
        products: Vec<String>,
    },

    /// Record a sale on the active channel
    Sale {
        /// Sold units as PRODUCT=COUNT (repeatable)
        #[arg(long = "line", value_name = "PRODUCT=COUNT", required = true)]
        lines: Vec<String>,

        /// Payment method label
        #[arg(long)]
        payment: String,

        /// Point-of-sale station
        #[arg(long)]
        station: Option<String>,
    },

    /// Join an existing channel as owner or seller
    Join {
        channel_id: String,
    },

    /// Fetch a channel (the active one by default) and refresh the local cache
    Reconcile {
        channel_id: Option<String>,
    },

    /// Poll the active channel until Ctrl-C
    Watch,

    /// Per-minute sales of each seller on the active channel
    Analytics,
}
