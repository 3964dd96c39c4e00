//! # Sales Analytics
//!
//! Per-minute sales totals for each seller over a trailing window.
//!
//! Bucket `window - 1` is the current minute, bucket 0 the oldest. Entries
//! older than the window, timestamps in the future, and sellers missing from
//! the roster are ignored. Counts come from the ledger and saturate at
//! `u64::MAX` instead of overflowing.

use crate::domain::{Address, Channel, TimestampMillis};

const MINUTE_MS: u64 = 60_000;

/// One seller's sales per minute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SalesSeries {
    pub seller: Address,
    pub per_minute: Vec<u64>,
}

impl SalesSeries {
    /// Units sold over the whole window.
    pub fn total(&self) -> u64 {
        self.per_minute
            .iter()
            .fold(0u64, |acc, count| acc.saturating_add(*count))
    }
}

/// Bucket the channel's sales into `window_minutes` per-minute totals.
///
/// Series are returned in roster order, one per distinct seller.
pub fn sales_per_seller(
    channel: &Channel,
    now_ms: TimestampMillis,
    window_minutes: usize,
) -> Vec<SalesSeries> {
    let mut series: Vec<SalesSeries> = Vec::with_capacity(channel.sellers.len());
    for seller in &channel.sellers {
        if !series.iter().any(|s| &s.seller == seller) {
            series.push(SalesSeries {
                seller: seller.clone(),
                per_minute: vec![0; window_minutes],
            });
        }
    }
    if window_minutes == 0 {
        return series;
    }

    let oldest = now_ms.saturating_sub((window_minutes as u64).saturating_mul(MINUTE_MS));
    for (timestamp, by_seller) in channel.sales.range(oldest..=now_ms) {
        let age_minutes = ((now_ms - timestamp) / MINUTE_MS) as usize;
        let Some(index) = (window_minutes - 1).checked_sub(age_minutes) else {
            continue;
        };

        for (seller, lines) in by_seller {
            if let Some(entry) = series.iter_mut().find(|s| &s.seller == seller) {
                let sold = lines
                    .values()
                    .fold(0u64, |acc, count| acc.saturating_add(*count));
                entry.per_minute[index] = entry.per_minute[index].saturating_add(sold);
            }
        }
    }

    series
}
