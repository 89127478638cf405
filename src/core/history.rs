//! Daily price history with a synthesized fallback series

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use rand::Rng;
use serde::Serialize;
use std::ops::Range;
use tracing::warn;

use super::commodity::{CommodityHistory, DataOrigin, Good};

pub const DEFAULT_HISTORY_DAYS: u32 = 30;

/// Longest series synthesized when the backend is down.
pub const MAX_SYNTHESIZED_DAYS: u32 = 3660;

#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Daily snapshots for the last `days` days, oldest first.
    async fn fetch_history(&self, days: u32) -> Result<Vec<CommodityHistory>>;
}

/// Placeholder range for each good when synthesizing history.
pub fn fallback_range(good: Good) -> Range<f64> {
    let (base, spread) = match good {
        Good::Soy => (155.0, 10.0),
        Good::Corn => (87.0, 5.0),
        Good::Milk => (2.40, 0.3),
        Good::Cattle => (305.0, 15.0),
        Good::Dollar => (5.15, 0.4),
    };
    base..base + spread
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryReport {
    pub history: Vec<CommodityHistory>,
    pub origin: DataOrigin,
}

/// Returns the remote series for the last `days` days, or a synthesized one
/// if the remote is unavailable. Never fails.
pub async fn get_history(
    source: &(dyn HistorySource + Send + Sync),
    days: u32,
) -> Vec<CommodityHistory> {
    load_history(source, days).await.history
}

pub async fn load_history(source: &(dyn HistorySource + Send + Sync), days: u32) -> HistoryReport {
    if days == 0 {
        return HistoryReport {
            history: Vec::new(),
            origin: DataOrigin::Live,
        };
    }

    match source.fetch_history(days).await {
        Ok(history) => HistoryReport {
            history,
            origin: DataOrigin::Live,
        },
        Err(e) => {
            warn!(error = ?e, days, "Commodity history unavailable, synthesizing series");
            let synthesized_days = days.min(MAX_SYNTHESIZED_DAYS);
            if synthesized_days < days {
                warn!(
                    requested = days,
                    synthesized = synthesized_days,
                    "Clamping synthesized history length"
                );
            }
            let mut rng = rand::thread_rng();
            HistoryReport {
                history: synthesize_history(synthesized_days, Utc::now().date_naive(), &mut rng),
                origin: DataOrigin::Fallback,
            }
        }
    }
}

/// Builds `days` independent daily entries ending on `today`.
///
/// The series never starts before `NaiveDate::MIN`; a longer request is
/// clamped and logged.
pub fn synthesize_history<R: Rng + ?Sized>(
    days: u32,
    today: NaiveDate,
    rng: &mut R,
) -> Vec<CommodityHistory> {
    let representable = (today - NaiveDate::MIN).num_days() + 1;
    let days = match u32::try_from(representable) {
        Ok(limit) if limit < days => {
            warn!(requested = days, limit, %today, "Clamping history to earliest representable date");
            limit
        }
        _ => days,
    };

    (0..days)
        .rev()
        .map(|offset| today - Days::new(u64::from(offset)))
        .map(|date| {
            let mut sample = |good| rng.gen_range(fallback_range(good));
            CommodityHistory {
                date,
                soy: sample(Good::Soy),
                corn: sample(Good::Corn),
                milk: sample(Good::Milk),
                cattle: sample(Good::Cattle),
                dollar: sample(Good::Dollar),
            }
        })
        .collect()
}
