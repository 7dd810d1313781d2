use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::core::market::ResponseMeta;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Live,
    Stale,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Live => style(text).green().bold(),
        StyleType::Stale => style(text).yellow().bold(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Right aligned numeric cell.
pub fn number_cell(value: f64, decimals: usize) -> Cell {
    Cell::new(format!("{value:.decimals$}")).set_alignment(CellAlignment::Right)
}

/// Creates a cell for displaying a signed change with color coding.
pub fn change_cell(change: f64, suffix: &str) -> Cell {
    let text = format!("{change:+.2}{suffix}");
    let color = if change >= 0.0 {
        Color::Green
    } else {
        Color::Red
    };
    Cell::new(text).fg(color).set_alignment(CellAlignment::Right)
}

/// One line summary of how fresh a response is.
pub fn freshness_line(meta: &ResponseMeta) -> String {
    let status = if meta.stale {
        style_text("STALE", StyleType::Stale)
    } else {
        style_text("LIVE", StyleType::Live)
    };
    let mut line = format!(
        "{status} {}",
        style_text(
            &format!(
                "source: {} | updated: {}",
                meta.source,
                meta.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            StyleType::Subtle
        )
    );
    if meta.quota_exhausted {
        line.push_str(&format!(
            "\n{}",
            style_text("Provider quota exhausted, showing fallback data", StyleType::Stale)
        ));
    }
    if let Some(message) = &meta.message {
        line.push_str(&format!("\n{}", style_text(message, StyleType::Subtle)));
    }
    line
}

/// Creates a spinner shown while providers are queried.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}")
    {
        pb.set_style(spinner_style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
