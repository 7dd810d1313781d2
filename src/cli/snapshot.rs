use super::ui;
use crate::core::market::SnapshotResponse;
use crate::services::MarketService;
use anyhow::Result;
use comfy_table::Cell;

impl SnapshotResponse {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Commodity"),
            ui::header_cell("Price"),
            ui::header_cell("Change"),
            ui::header_cell("Change (%)"),
            ui::header_cell("Updated"),
        ]);

        for quote in &self.data {
            table.add_row(vec![
                Cell::new(&quote.name),
                Cell::new(format!("{:.2} {}", quote.price, quote.currency))
                    .set_alignment(comfy_table::CellAlignment::Right),
                ui::change_cell(quote.change, ""),
                ui::change_cell(quote.change_percent, "%"),
                Cell::new(quote.updated_at.format("%Y-%m-%d").to_string()),
            ]);
        }

        format!(
            "{}\n\n{}\n\n{}",
            ui::style_text("Commodity Snapshot", ui::StyleType::Title),
            table,
            ui::freshness_line(&self.meta)
        )
    }
}

pub async fn run(market: &MarketService, json: bool) -> Result<()> {
    let pb = ui::new_spinner("Fetching quotes...");
    let response = market.snapshot().await;
    pb.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", response.display_as_table());
    }
    Ok(())
}
