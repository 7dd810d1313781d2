use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

use super::http::{build_client, fetch_json};
use crate::core::config::{ProviderEndpoint, TrackedSymbol};
use crate::core::error::{ProviderError, ProviderResult};
use crate::core::market::{CandlePoint, ChartRange, Quote};
use crate::core::provider::{HistoryProvider, QuoteProvider};

#[derive(Deserialize, Debug)]
struct TimeSeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    series: Option<HashMap<String, TimeSeriesRow>>,
}

#[derive(Deserialize, Debug)]
struct TimeSeriesRow {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: Option<String>,
}

fn parse_number(raw: &str, field: &str, date: &str) -> ProviderResult<f64> {
    raw.trim()
        .parse()
        .map_err(|_| ProviderError::Failure(format!("Invalid {field} '{raw}' for {date}")))
}

fn parse_row(date: &str, row: &TimeSeriesRow) -> ProviderResult<CandlePoint> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| ProviderError::Failure(format!("Invalid series date: {date}")))?;

    Ok(CandlePoint {
        time: day.and_time(NaiveTime::MIN).and_utc().timestamp(),
        open: parse_number(&row.open, "open", date)?,
        high: parse_number(&row.high, "high", date)?,
        low: parse_number(&row.low, "low", date)?,
        close: parse_number(&row.close, "close", date)?,
        volume: match &row.volume {
            Some(volume) => parse_number(volume, "volume", date)?,
            None => 0.0,
        },
    })
}

/// Keeps the trailing `days` points of an ascending series.
fn trailing(mut points: Vec<CandlePoint>, days: usize) -> Vec<CandlePoint> {
    let skip = points.len().saturating_sub(days);
    points.drain(..skip);
    points
}

/// Daily series from Alpha Vantage, fetched through each symbol's ETF proxy.
pub struct AlphaVantageProvider {
    base_url: String,
    api_key: String,
    client: Client,
}

impl AlphaVantageProvider {
    pub fn new(endpoint: &ProviderEndpoint, timeout: Duration) -> ProviderResult<Self> {
        Ok(AlphaVantageProvider {
            base_url: endpoint.base_url.trim_end_matches('/').to_string(),
            api_key: endpoint.api_key.clone(),
            client: build_client(timeout)?,
        })
    }

    #[instrument(
        name = "AlphaVantageSeriesFetch",
        skip(self, symbol),
        fields(symbol = %symbol.symbol, ticker = %symbol.ticker)
    )]
    async fn fetch_full_series(&self, symbol: &TrackedSymbol) -> ProviderResult<Vec<CandlePoint>> {
        let url = Url::parse_with_params(
            &format!("{}/query", self.base_url),
            &[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol.ticker.as_str()),
                ("outputsize", "full"),
                ("apikey", self.api_key.as_str()),
            ],
        )
        .map_err(|e| ProviderError::Failure(format!("Invalid Alpha Vantage URL: {e}")))?;
        debug!("Requesting daily series for {}", symbol.ticker);

        let payload: TimeSeriesResponse = fetch_json(&self.client, url).await?;
        let rows = payload
            .series
            .filter(|series| !series.is_empty())
            .ok_or_else(|| {
                ProviderError::Failure(format!("No daily series returned for {}", symbol.symbol))
            })?;

        let mut points = rows
            .iter()
            .map(|(date, row)| parse_row(date, row))
            .collect::<ProviderResult<Vec<_>>>()?;
        points.sort_by_key(|point| point.time);

        debug!("Received {} daily points", points.len());
        Ok(points)
    }
}

#[async_trait]
impl HistoryProvider for AlphaVantageProvider {
    async fn fetch_history(
        &self,
        symbol: &TrackedSymbol,
        range: ChartRange,
    ) -> ProviderResult<Vec<CandlePoint>> {
        let points = self.fetch_full_series(symbol).await?;
        Ok(trailing(points, range.provider_days()))
    }
}

#[async_trait]
impl QuoteProvider for AlphaVantageProvider {
    async fn fetch_quote(&self, symbol: &TrackedSymbol) -> ProviderResult<Quote> {
        let points = self.fetch_full_series(symbol).await?;

        let (previous, latest) = match points.as_slice() {
            [.., previous, latest] => (previous, latest),
            _ => {
                return Err(ProviderError::Failure(format!(
                    "Not enough data to compute quote for {}",
                    symbol.symbol
                )));
            }
        };

        let updated_at = DateTime::from_timestamp(latest.time, 0).unwrap_or_else(Utc::now);
        Ok(Quote::new(
            &symbol.symbol,
            &symbol.name,
            latest.close,
            previous.close,
            "USD",
            updated_at,
        ))
    }
}
