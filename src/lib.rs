pub mod cli;
pub mod core;
pub mod providers;
pub mod services;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::market::ChartRange;
use crate::providers::{AlphaVantageProvider, NewsApiProvider};
use crate::services::{HistoryService, LastKnownGood, MarketService, NewsService};
use crate::store::Store;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Snapshot,
    History { symbol: String, range: String },
    News { symbol: String },
}

/// The three services wired to the configured providers, sharing one
/// last-known-good table. Caches and the table live in `store`.
pub struct MarketData {
    pub market: MarketService,
    pub history: HistoryService,
    pub news: NewsService,
}

impl MarketData {
    pub async fn from_config(config: &AppConfig, store: &Store) -> Result<Self> {
        let timeout = config.request_timeout();
        let alpha_vantage = Arc::new(
            AlphaVantageProvider::new(&config.providers.alpha_vantage, timeout)
                .context("Failed to create Alpha Vantage provider")?,
        );
        let news_api = Arc::new(
            NewsApiProvider::new(&config.providers.news_api, timeout)
                .context("Failed to create NewsAPI provider")?,
        );
        let last_known = Arc::new(
            LastKnownGood::restore(&config.symbols, store.disk_cache("last_known")?).await,
        );

        Ok(MarketData {
            market: MarketService::new(alpha_vantage.clone(), last_known.clone(), config)
                .with_cache(store.cache("snapshot")?),
            history: HistoryService::new(alpha_vantage, last_known, config)
                .with_cache(store.cache("history")?),
            news: NewsService::new(news_api, config).with_cache(store.cache("news")?),
        })
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>, json: bool) -> Result<()> {
    info!("Commodity tracker starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    // Input is validated before any provider is contacted
    match command {
        AppCommand::Snapshot => {
            let store = Store::from_config(&config)?;
            let data = MarketData::from_config(&config, &store).await?;
            cli::snapshot::run(&data.market, json).await
        }
        AppCommand::History { symbol, range } => {
            let tracked = config.tracked_symbol(&symbol)?;
            let range: ChartRange = range.parse()?;
            let store = Store::from_config(&config)?;
            let data = MarketData::from_config(&config, &store).await?;
            cli::history::run(&data.history, tracked, range, json).await
        }
        AppCommand::News { symbol } => {
            let tracked = config.tracked_symbol(&symbol)?;
            let store = Store::from_config(&config)?;
            let data = MarketData::from_config(&config, &store).await?;
            cli::news::run(&data.news, tracked, json).await
        }
    }
}
