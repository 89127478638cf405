//! Core business logic abstractions

pub mod aggregator;
pub mod commodity;
pub mod config;
pub mod history;
pub mod log;
pub mod price;

// Re-export main types for cleaner imports
pub use aggregator::{PriceReport, fetch_prices, get_prices};
pub use commodity::{
    CommodityHistory, CommodityPrice, DataOrigin, Good, Quote, RegionalIndex, Trend,
};
pub use history::{HistoryReport, HistorySource, get_history, load_history};
pub use price::PriceSource;
