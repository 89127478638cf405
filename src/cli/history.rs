use super::ui;
use crate::core::{CommodityHistory, DataOrigin, Good, HistoryReport, HistorySource, load_history};
use anyhow::{Context, Result};
use comfy_table::Cell;

/// Percentage change of each good between the first and last day.
pub fn period_changes(history: &[CommodityHistory]) -> Vec<(Good, Option<f64>)> {
    Good::ALL
        .into_iter()
        .map(|good| {
            let change = match (history.first(), history.last()) {
                (Some(first), Some(last)) if history.len() >= 2 && first.value(good) > 0.0 => {
                    let start = first.value(good);
                    Some((last.value(good) - start) / start * 100.0)
                }
                _ => None,
            };
            (good, change)
        })
        .collect()
}

impl HistoryReport {
    /// JSON rendering, `origin` included so synthesized data stays labeled.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize price history")
    }

    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();

        let mut header = vec![ui::header_cell("Date")];
        header.extend(Good::ALL.iter().map(|good| ui::header_cell(good.name())));
        table.set_header(header);

        for day in &self.history {
            let mut row = vec![Cell::new(day.date.format("%Y-%m-%d"))];
            row.extend(Good::ALL.iter().map(|good| ui::number_cell(day.value(*good))));
            table.add_row(row);
        }

        let mut change_row = vec![ui::header_cell("Change")];
        change_row.extend(
            period_changes(&self.history)
                .into_iter()
                .map(|(_, change)| ui::format_optional_cell(change, ui::change_cell)),
        );
        table.add_row(change_row);

        let mut output = format!(
            "{}\n\n",
            ui::style_text(
                &format!("Price History ({} days)", self.history.len()),
                ui::StyleType::Title
            )
        );
        output.push_str(&table.to_string());

        if self.origin == DataOrigin::Fallback {
            output.push_str(&format!(
                "\n\n{}",
                ui::style_text(
                    "Backend unavailable: values are simulated placeholders.",
                    ui::StyleType::Warning
                )
            ));
        }

        output
    }
}

pub async fn run(source: &(dyn HistorySource + Send + Sync), days: u32, json: bool) -> Result<()> {
    let pb = ui::new_spinner("Fetching price history...");
    let report = load_history(source, days).await;
    pb.finish_and_clear();

    if json {
        println!("{}", report.to_json()?);
    } else {
        println!("{}", report.display_as_table());
    }

    Ok(())
}
