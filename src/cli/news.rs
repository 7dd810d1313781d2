use super::ui;
use crate::core::config::TrackedSymbol;
use crate::core::market::NewsResponse;
use crate::services::NewsService;
use anyhow::{Context, Result};
use comfy_table::Cell;

impl NewsResponse {
    pub fn display_as_table(&self, symbol: &str) -> String {
        let title = ui::style_text(&format!("{symbol} headlines"), ui::StyleType::Title);
        if self.data.is_empty() {
            return format!(
                "{title}\n\nNo headlines available.\n\n{}",
                ui::freshness_line(&self.meta)
            );
        }

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Published"),
            ui::header_cell("Source"),
            ui::header_cell("Title"),
        ]);

        for headline in &self.data {
            table.add_row(vec![
                Cell::new(headline.published_at.format("%Y-%m-%d %H:%M").to_string()),
                Cell::new(&headline.source),
                Cell::new(format!(
                    "{}\n{}",
                    headline.title,
                    ui::style_text(&headline.url, ui::StyleType::Subtle)
                )),
            ]);
        }

        format!("{title}\n\n{table}\n\n{}", ui::freshness_line(&self.meta))
    }
}

pub async fn run(news: &NewsService, symbol: &TrackedSymbol, json: bool) -> Result<()> {
    let pb = ui::new_spinner(&format!("Fetching {} headlines...", symbol.symbol));
    let result = news.news(symbol).await;
    pb.finish_and_clear();

    let response =
        result.with_context(|| format!("Failed to fetch news for {}", symbol.symbol))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", response.display_as_table(&symbol.symbol));
    }
    Ok(())
}
