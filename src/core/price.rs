//! Price feed abstractions

use anyhow::Result;
use async_trait::async_trait;

use super::commodity::{CommodityPrice, Quote, RegionalIndex};

/// The three snapshot feeds behind the price aggregator.
///
/// `Ok(None)` means the call completed but carried no payload. Any `Err` is
/// treated as the remote being unavailable.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Broad commodity catalog, in display order.
    async fn fetch_primary_list(&self) -> Result<Option<Vec<CommodityPrice>>>;

    async fn fetch_regional_index(&self) -> Result<Option<RegionalIndex>>;

    /// USD/BRL exchange rate.
    async fn fetch_currency(&self) -> Result<Option<Quote>>;
}
