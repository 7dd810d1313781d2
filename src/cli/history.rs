use super::ui;
use crate::core::config::TrackedSymbol;
use crate::core::market::{ChartRange, HistoryResponse};
use crate::services::HistoryService;
use anyhow::{Context, Result};
use chrono::DateTime;
use comfy_table::Cell;

impl HistoryResponse {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Date"),
            ui::header_cell("Open"),
            ui::header_cell("High"),
            ui::header_cell("Low"),
            ui::header_cell("Close"),
            ui::header_cell("Volume"),
        ]);

        for point in &self.data {
            let date = DateTime::from_timestamp(point.time, 0)
                .map_or_else(|| point.time.to_string(), |d| d.format("%Y-%m-%d").to_string());
            table.add_row(vec![
                Cell::new(date),
                ui::number_cell(point.open, 2),
                ui::number_cell(point.high, 2),
                ui::number_cell(point.low, 2),
                ui::number_cell(point.close, 2),
                ui::number_cell(point.volume, 0),
            ]);
        }

        format!(
            "{}\n\n{}\n\n{}",
            ui::style_text(
                &format!("{} history ({})", self.symbol, self.range),
                ui::StyleType::Title
            ),
            table,
            ui::freshness_line(&self.meta)
        )
    }
}

pub async fn run(
    history: &HistoryService,
    symbol: &TrackedSymbol,
    range: ChartRange,
    json: bool,
) -> Result<()> {
    let pb = ui::new_spinner(&format!("Fetching {} history...", symbol.symbol));
    let result = history.history(symbol, range).await;
    pb.finish_and_clear();

    let response = result
        .with_context(|| format!("Failed to fetch {range} history for {}", symbol.symbol))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", response.display_as_table());
    }
    Ok(())
}
