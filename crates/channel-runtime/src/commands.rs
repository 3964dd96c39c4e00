//! Subcommand handlers.

use anyhow::{anyhow, bail, Context, Result};
use dag_crypto::is_valid_dag_address;
use sales_channel::{
    BatchOutcome, InventoryInput, ProductInput, Reconciliation, SaleLine, SalesChannelApi,
    SalesChannelService,
};
use tracing::warn;

use crate::cli::ChannelCommand;

/// Split `KEY=VALUE`, trimming both sides. Values are validated later.
pub fn parse_pair(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got {raw:?}"))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("missing name in {raw:?}");
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn parse_products(raw: &[String]) -> Result<Vec<ProductInput>> {
    raw.iter()
        .map(|entry| parse_pair(entry).map(|(name, price)| ProductInput::new(name, price)))
        .collect()
}

fn parse_sale_lines(raw: &[String]) -> Result<Vec<SaleLine>> {
    raw.iter()
        .map(|entry| {
            let (product, count) = parse_pair(entry)?;
            let count: u64 = count
                .parse()
                .with_context(|| format!("sale count for {product} must be a whole number"))?;
            Ok(SaleLine::new(product, count))
        })
        .collect()
}

/// Sellers with a well-formed DAG address; the rest are reported and dropped.
pub fn well_formed_sellers(sellers: Vec<String>) -> Vec<String> {
    sellers
        .into_iter()
        .filter(|seller| {
            let valid = is_valid_dag_address(seller);
            if !valid {
                warn!(seller = %seller, "Skipping malformed DAG address");
            }
            valid
        })
        .collect()
}

/// Run a subcommand that needs the service.
pub async fn run(command: ChannelCommand, service: &SalesChannelService) -> Result<()> {
    match command {
        ChannelCommand::Identity => {
            let identity = service.identity().await?;
            println!("address:  {}", identity.address);
            println!("proof id: {}", identity.proof_id());
        }
        ChannelCommand::CreateChannel { name, products } => {
            let channel_id = service
                .create_channel(&name, parse_products(&products)?)
                .await?;
            println!("created channel {channel_id} (now active)");
        }
        ChannelCommand::AddInventory { items } => {
            let items = items
                .iter()
                .map(|entry| parse_pair(entry).map(|(p, a)| InventoryInput::new(p, a)))
                .collect::<Result<Vec<_>>>()?;
            report_batch("inventory line", &service.add_inventory(items).await?)?;
        }
        ChannelCommand::MoveInventory {
            to,
            product,
            amount,
        } => {
            let hash = service.move_inventory(&to, &product, &amount).await?;
            println!("moved {amount} {product} to {to}: {hash}");
        }
        ChannelCommand::AddSellers { sellers } => {
            let sellers = well_formed_sellers(sellers);
            if sellers.is_empty() {
                bail!("no valid seller addresses given");
            }
            report_batch("seller", &service.add_sellers(sellers).await?)?;
        }
        ChannelCommand::AddProducts { products } => {
            let hash = service.add_products(parse_products(&products)?).await?;
            println!("catalog updated: {hash}");
        }
        ChannelCommand::Sale {
            lines,
            payment,
            station,
        } => {
            let hash = service
                .record_sale(parse_sale_lines(&lines)?, &payment, station)
                .await?;
            println!("sale recorded: {hash}");
        }
        ChannelCommand::Join { channel_id } => {
            let joined = service.join_channel(&channel_id).await?;
            print_channel(&joined);
        }
        ChannelCommand::Reconcile { channel_id } => {
            let reconciled = match channel_id {
                Some(id) => service.reconcile(&id).await?,
                None => service.reconcile_active().await?,
            };
            print_channel(&reconciled);
        }
        ChannelCommand::Watch => watch(service).await?,
        ChannelCommand::Analytics => {
            for series in service.sales_analytics().await? {
                let minutes: Vec<String> = series.per_minute.iter().map(u64::to_string).collect();
                println!("{}  total {:>4}  [{}]", series.seller, series.total(), minutes.join(" "));
            }
        }
    }
    Ok(())
}

async fn watch(service: &SalesChannelService) -> Result<()> {
    let poller = service.watch().await?;
    let mut updates = poller.subscribe();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                match updates.borrow_and_update().clone() {
                    Some(Ok(reconciled)) => print_channel(&reconciled),
                    Some(Err(error)) => eprintln!("poll failed: {error}"),
                    None => {}
                }
            }
        }
    }

    poller.stop();
    Ok(())
}

fn report_batch(what: &str, outcome: &BatchOutcome) -> Result<()> {
    for record in &outcome.confirmed {
        println!("{} {what} confirmed: {}", record.id, record.hash.as_deref().unwrap_or("-"));
    }
    for record in &outcome.failed {
        let reason = record
            .last_error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        eprintln!("{} {what} failed: {reason}", record.id);
    }
    if !outcome.all_confirmed() {
        bail!("{} of {} {what}s failed", outcome.failed.len(), outcome.len());
    }
    Ok(())
}

fn print_channel(reconciled: &Reconciliation) {
    let channel = &reconciled.channel;
    println!("{} ({})", channel.name, channel.id);
    println!("  role:  {}", reconciled.role.as_str());
    println!("  owner: {}", channel.owner);

    println!("  products:");
    for (name, price) in channel.products_by_price() {
        println!("    {name:<20} {price}");
    }

    println!("  sellers:");
    for seller in channel.sellers_excluding_owner() {
        let stock: Vec<String> = channel
            .inventory
            .get(seller)
            .map(|items| items.iter().map(|(p, n)| format!("{p}={n}")).collect())
            .unwrap_or_default();
        println!("    {seller}  {}", stock.join(" "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            parse_pair(" tea = 2.5 ").unwrap(),
            ("tea".to_string(), "2.5".to_string())
        );
        // Empty values pass through to the builder, which rejects them
        assert_eq!(parse_pair("tea=").unwrap(), ("tea".to_string(), String::new()));
        assert!(parse_pair("tea").is_err());
        assert!(parse_pair("=3").is_err());
    }

    #[test]
    fn test_parse_sale_lines() {
        let lines = parse_sale_lines(&["tea=2".into(), "cake=1".into()]).unwrap();
        assert_eq!(lines, vec![SaleLine::new("tea", 2), SaleLine::new("cake", 1)]);
        assert!(parse_sale_lines(&["tea=1.5".into()]).is_err());
    }

    #[test]
    fn test_well_formed_sellers() {
        let good = dag_crypto::DagKeyPair::generate().address();
        let kept = well_formed_sellers(vec![good.clone(), "DAGnotanaddress".into()]);
        assert_eq!(kept, vec![good]);
    }
}
