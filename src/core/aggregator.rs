//! Merges the primary commodity list with the specialized feeds.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use super::commodity::{CommodityPrice, DataOrigin, Good, Quote, RegionalIndex, Trend};
use super::price::PriceSource;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceReport {
    pub prices: Vec<CommodityPrice>,
    pub origin: DataOrigin,
}

/// Fetches all three feeds concurrently and returns the merged price list.
///
/// Never fails. A failed primary list yields [`fallback_prices`]; a failed
/// specialized feed leaves the primary entries untouched.
pub async fn get_prices(source: &(dyn PriceSource + Send + Sync)) -> Vec<CommodityPrice> {
    fetch_prices(source).await.prices
}

/// Same as [`get_prices`], also reporting whether the list is the fallback.
pub async fn fetch_prices(source: &(dyn PriceSource + Send + Sync)) -> PriceReport {
    let (primary, regional, currency) = futures::join!(
        source.fetch_primary_list(),
        source.fetch_regional_index(),
        source.fetch_currency()
    );

    let primary = match primary {
        Ok(list) => list,
        Err(e) => {
            warn!(error = ?e, "Primary commodity list unavailable, using fallback prices");
            return PriceReport {
                prices: fallback_prices(Utc::now()),
                origin: DataOrigin::Fallback,
            };
        }
    };

    let regional = regional.unwrap_or_else(|e| {
        warn!(error = ?e, "Regional index unavailable");
        None
    });

    let currency = currency.unwrap_or_else(|e| {
        warn!(error = ?e, "Currency feed unavailable");
        None
    });

    let prices = match (primary, regional) {
        (Some(list), Some(index)) => merge_prices(list, &index, currency.as_ref()),
        (list, _) => {
            debug!("Regional index absent, returning primary list as-is");
            list.unwrap_or_default()
        }
    };

    PriceReport {
        prices,
        origin: DataOrigin::Live,
    }
}

/// Applies regional index and currency quotes onto the primary list.
///
/// Order and length of `primary` are preserved; entries are only ever
/// overwritten in place.
pub fn merge_prices(
    primary: Vec<CommodityPrice>,
    regional: &RegionalIndex,
    currency: Option<&Quote>,
) -> Vec<CommodityPrice> {
    primary
        .into_iter()
        .map(|mut item| {
            let quote = match Good::from_name(&item.name) {
                Some(good) if good.is_regional() => regional.quote_for(good),
                Some(Good::Dollar) => currency,
                _ => None,
            };
            if let Some(quote) = quote {
                item.apply_quote(quote);
            }
            item
        })
        .collect()
}

/// Fixed price list shown when live data is unavailable.
pub fn fallback_prices(now: DateTime<Utc>) -> Vec<CommodityPrice> {
    let entry = |good: Good, price: f64, unit: &str, change: f64, icon: &str, source: Option<&str>| {
        CommodityPrice {
            name: good.name().to_string(),
            price,
            unit: unit.to_string(),
            change,
            trend: Trend::from_change(change),
            icon: icon.to_string(),
            last_update: Some(now),
            source: source.map(str::to_string),
        }
    };

    vec![
        entry(Good::Soy, 158.50, "saca 60kg", 1.2, "🌱", Some("CEPEA - Paraná")),
        entry(Good::Corn, 90.00, "saca 60kg", -0.5, "🌽", Some("CEPEA - Paraná")),
        entry(Good::Milk, 2.73, "litro", 0.8, "🥛", Some("Conseleite - Paraná")),
        entry(Good::Cattle, 312.00, "@", 1.5, "🐂", None),
        entry(Good::Dollar, 5.23, "R$", -0.5, "💵", None),
    ]
}
