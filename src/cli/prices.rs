use super::ui;
use crate::core::{CommodityPrice, DataOrigin, PriceReport, PriceSource, fetch_prices};
use anyhow::{Context, Result};
use comfy_table::Cell;

impl PriceReport {
    /// JSON rendering, `origin` included so fallback data stays labeled.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize commodity prices")
    }

    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();

        table.set_header(vec![
            ui::header_cell("Commodity"),
            ui::header_cell("Price"),
            ui::header_cell("Unit"),
            ui::header_cell("Change"),
            ui::header_cell("Source"),
            ui::header_cell("Updated"),
        ]);

        for item in &self.prices {
            table.add_row(price_row(item));
        }

        let mut output = format!(
            "{}\n\n",
            ui::style_text("Commodity Prices", ui::StyleType::Title)
        );

        if self.prices.is_empty() {
            output.push_str(&ui::style_text(
                "No commodity prices available.",
                ui::StyleType::Subtle,
            ));
            return output;
        }

        output.push_str(&table.to_string());

        if self.origin == DataOrigin::Fallback {
            output.push_str(&format!(
                "\n\n{}",
                ui::style_text(
                    "Backend unavailable: showing reference prices, not live quotes.",
                    ui::StyleType::Warning
                )
            ));
        }

        output
    }
}

fn price_row(item: &CommodityPrice) -> Vec<Cell> {
    vec![
        Cell::new(format!("{} {}", item.icon, item.name)),
        ui::number_cell(item.price),
        Cell::new(&item.unit),
        ui::change_cell(item.change),
        ui::format_optional_cell(item.source.as_deref(), Cell::new),
        ui::format_optional_cell(item.last_update, |t| {
            Cell::new(t.format("%Y-%m-%d %H:%M UTC"))
        }),
    ]
}

pub async fn run(source: &(dyn PriceSource + Send + Sync), json: bool) -> Result<()> {
    let pb = ui::new_spinner("Fetching commodity prices...");
    let report = fetch_prices(source).await;
    pb.finish_and_clear();

    if json {
        println!("{}", report.to_json()?);
    } else {
        println!("{}", report.display_as_table());
    }

    Ok(())
}
