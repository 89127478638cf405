//! Commodity domain types

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use tracing::debug;

/// The five goods the dashboard tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Good {
    Soy,
    Corn,
    Milk,
    Cattle,
    Dollar,
}

impl Good {
    pub const ALL: [Good; 5] = [Good::Soy, Good::Corn, Good::Milk, Good::Cattle, Good::Dollar];

    /// Name as published by the backend's commodity list.
    pub fn name(&self) -> &'static str {
        match self {
            Good::Soy => "Soja",
            Good::Corn => "Milho",
            Good::Milk => "Leite",
            Good::Cattle => "Boi Gordo",
            Good::Dollar => "Dólar",
        }
    }

    pub fn from_name(name: &str) -> Option<Good> {
        Good::ALL.into_iter().find(|good| good.name() == name)
    }

    /// Goods quoted by the regional index feed.
    pub fn is_regional(&self) -> bool {
        matches!(self, Good::Soy | Good::Corn | Good::Milk)
    }
}

impl Display for Good {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Whether a result came from the backend or was substituted locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataOrigin {
    Live,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    pub fn from_change(change: f64) -> Self {
        if change >= 0.0 { Trend::Up } else { Trend::Down }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommodityPrice {
    pub name: String,
    pub price: f64,
    pub unit: String,
    pub change: f64,
    pub trend: Trend,
    pub icon: String,
    /// `None` when upstream omits the timestamp or sends one we cannot read.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Parses a capture timestamp as RFC 3339, a naive date-time (taken as UTC)
/// or a bare date (midnight UTC). Anything else becomes `None`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
    {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    let parsed = match &raw {
        serde_json::Value::Null => return Ok(None),
        serde_json::Value::String(text) => parse_timestamp(text),
        // Epoch milliseconds.
        serde_json::Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    };
    if parsed.is_none() {
        debug!(last_update = %raw, "Ignoring unreadable lastUpdate");
    }
    Ok(parsed)
}

impl CommodityPrice {
    /// Overwrites the quoted fields with a specialized feed's value, keeping
    /// name, unit, icon and capture time.
    pub fn apply_quote(&mut self, quote: &Quote) {
        self.price = quote.price;
        self.change = quote.change;
        self.trend = quote.trend;
        self.source = quote.source.clone();
    }
}

/// A single value from a specialized feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub price: f64,
    pub change: f64,
    pub trend: Trend,
    #[serde(default)]
    pub source: Option<String>,
}

/// Regional index snapshot. Each good may be missing independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionalIndex {
    #[serde(rename = "soja", default)]
    pub soy: Option<Quote>,
    #[serde(rename = "milho", default)]
    pub corn: Option<Quote>,
    #[serde(rename = "leite", default)]
    pub milk: Option<Quote>,
}

impl RegionalIndex {
    pub fn quote_for(&self, good: Good) -> Option<&Quote> {
        match good {
            Good::Soy => self.soy.as_ref(),
            Good::Corn => self.corn.as_ref(),
            Good::Milk => self.milk.as_ref(),
            Good::Cattle | Good::Dollar => None,
        }
    }
}

/// One calendar day of prices for the tracked goods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommodityHistory {
    pub date: NaiveDate,
    #[serde(rename = "soja")]
    pub soy: f64,
    #[serde(rename = "milho")]
    pub corn: f64,
    #[serde(rename = "leite")]
    pub milk: f64,
    #[serde(rename = "boiGordo")]
    pub cattle: f64,
    #[serde(rename = "dolar")]
    pub dollar: f64,
}

impl CommodityHistory {
    pub fn value(&self, good: Good) -> f64 {
        match good {
            Good::Soy => self.soy,
            Good::Corn => self.corn,
            Good::Milk => self.milk,
            Good::Cattle => self.cattle,
            Good::Dollar => self.dollar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_good_names_round_trip() {
        for good in Good::ALL {
            assert_eq!(Good::from_name(good.name()), Some(good));
        }
        assert_eq!(Good::from_name("Café"), None);
        assert_eq!(Good::from_name("soja"), None);
    }

    #[test]
    fn test_regional_goods() {
        let regional: Vec<Good> = Good::ALL.into_iter().filter(Good::is_regional).collect();
        assert_eq!(regional, vec![Good::Soy, Good::Corn, Good::Milk]);
    }

    #[test]
    fn test_trend_from_change() {
        assert_eq!(Trend::from_change(1.2), Trend::Up);
        assert_eq!(Trend::from_change(0.0), Trend::Up);
        assert_eq!(Trend::from_change(-0.5), Trend::Down);
    }

    #[test]
    fn test_commodity_price_deserialization() {
        let json = r#"{
            "name": "Boi Gordo",
            "price": 312.0,
            "unit": "@",
            "change": 1.5,
            "trend": "up",
            "icon": "🐂",
            "lastUpdate": "2025-06-30T12:00:00.000Z"
        }"#;

        let price: CommodityPrice = serde_json::from_str(json).unwrap();
        assert_eq!(price.name, "Boi Gordo");
        assert_eq!(price.trend, Trend::Up);
        assert!(price.source.is_none());
        assert_eq!(
            price.last_update.map(|t| t.date_naive().to_string()),
            Some("2025-06-30".to_string())
        );

        let out = serde_json::to_value(&price).unwrap();
        assert!(out.get("lastUpdate").is_some());
        assert!(out.get("source").is_none());
    }

    #[test]
    fn test_unusual_last_update_keeps_entry() {
        let json = r#"[
            {"name":"Soja","price":150.0,"unit":"saca 60kg","change":0.2,"trend":"up","icon":"🌱","lastUpdate":"2025-06-30"},
            {"name":"Milho","price":80.0,"unit":"saca 60kg","change":0.3,"trend":"up","icon":"🌽","lastUpdate":"30/06/2025"},
            {"name":"Leite","price":2.5,"unit":"litro","change":0.4,"trend":"up","icon":"🥛","lastUpdate":null},
            {"name":"Boi Gordo","price":300.0,"unit":"@","change":0.1,"trend":"up","icon":"🐂","lastUpdate":1751286600000},
            {"name":"Dólar","price":5.0,"unit":"R$","change":0.5,"trend":"up","icon":"💵"}
        ]"#;

        let prices: Vec<CommodityPrice> = serde_json::from_str(json).unwrap();
        assert_eq!(prices.len(), 5);
        assert_eq!(
            prices[0].last_update,
            "2025-06-30T00:00:00Z".parse::<DateTime<Utc>>().ok()
        );
        assert!(prices[1].last_update.is_none());
        assert!(prices[2].last_update.is_none());
        assert_eq!(
            prices[3].last_update,
            "2025-06-30T12:30:00Z".parse::<DateTime<Utc>>().ok()
        );
        assert!(prices[4].last_update.is_none());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = "2025-06-30T12:30:00Z".parse::<DateTime<Utc>>().ok();
        assert_eq!(parse_timestamp("2025-06-30T12:30:00Z"), expected);
        assert_eq!(parse_timestamp("2025-06-30T09:30:00-03:00"), expected);
        assert_eq!(parse_timestamp("2025-06-30T12:30:00.000"), expected);
        assert_eq!(parse_timestamp("2025-06-30 12:30:00"), expected);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_regional_index_partial() {
        let json = r#"{
            "soja": { "price": 160.1, "change": 0.4, "trend": "up", "source": "CEPEA - Paraná" },
            "leite": null
        }"#;

        let index: RegionalIndex = serde_json::from_str(json).unwrap();
        assert_eq!(index.quote_for(Good::Soy).map(|q| q.price), Some(160.1));
        assert!(index.quote_for(Good::Corn).is_none());
        assert!(index.quote_for(Good::Milk).is_none());
        assert!(index.quote_for(Good::Dollar).is_none());
    }

    #[test]
    fn test_history_wire_format() {
        let json = r#"{"date":"2025-07-01","soja":158.2,"milho":89.1,"leite":2.55,"boiGordo":310.0,"dolar":5.3}"#;
        let day: CommodityHistory = serde_json::from_str(json).unwrap();
        assert_eq!(day.date, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
        assert_eq!(day.value(Good::Cattle), 310.0);
        assert_eq!(day.value(Good::Dollar), 5.3);
    }
}
