//! Market data types and the outbound response shapes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

use super::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum ChartRange {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "5D")]
    FiveDays,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "1Y")]
    OneYear,
}

impl Display for ChartRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ChartRange::OneDay => "1D",
                ChartRange::FiveDays => "5D",
                ChartRange::OneMonth => "1M",
                ChartRange::ThreeMonths => "3M",
                ChartRange::OneYear => "1Y",
            }
        )
    }
}

impl ChartRange {
    pub const ALL: [ChartRange; 5] = [
        ChartRange::OneDay,
        ChartRange::FiveDays,
        ChartRange::OneMonth,
        ChartRange::ThreeMonths,
        ChartRange::OneYear,
    ];

    /// Number of trailing daily bars a provider series is cut to.
    pub fn provider_days(&self) -> usize {
        match self {
            ChartRange::OneDay => 2,
            ChartRange::FiveDays => 7,
            ChartRange::OneMonth => 35,
            ChartRange::ThreeMonths => 100,
            ChartRange::OneYear => 370,
        }
    }
}

impl FromStr for ChartRange {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "1D" => Ok(ChartRange::OneDay),
            "5D" => Ok(ChartRange::FiveDays),
            "1M" => Ok(ChartRange::OneMonth),
            "3M" => Ok(ChartRange::ThreeMonths),
            "1Y" => Ok(ChartRange::OneYear),
            _ => Err(ValidationError::UnknownRange(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub previous_close: f64,
    pub change: f64,
    pub change_percent: f64,
    pub currency: String,
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    /// Builds a quote, deriving `change` and `change_percent` from the two prices.
    pub fn new(
        symbol: &str,
        name: &str,
        price: f64,
        previous_close: f64,
        currency: &str,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let change = price - previous_close;
        // A zero previous close would divide to NaN/inf.
        let change_percent = if previous_close == 0.0 {
            0.0
        } else {
            (change / previous_close) * 100.0
        };

        Quote {
            symbol: symbol.to_string(),
            name: name.to_string(),
            price,
            previous_close,
            change,
            change_percent,
            currency: currency.to_string(),
            updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandlePoint {
    /// Unix seconds
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Headline {
    pub id: String,
    pub title: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub url: String,
    pub symbol: String,
}

impl Headline {
    pub fn headline_id(symbol: &str, url: &str) -> String {
        format!("{symbol}-{url}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Cache,
}

impl Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Live => write!(f, "live"),
            DataSource::Cache => write!(f, "cache"),
        }
    }
}

/// Freshness metadata attached to every response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    pub updated_at: DateTime<Utc>,
    pub stale: bool,
    pub quota_exhausted: bool,
    pub source: DataSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ResponseMeta {
    /// Meta for a response served straight from a successful provider call.
    pub fn live() -> Self {
        ResponseMeta {
            updated_at: Utc::now(),
            stale: false,
            quota_exhausted: false,
            source: DataSource::Live,
            message: None,
        }
    }

    /// Meta for a degraded response produced after a quota signal.
    pub fn quota_exhausted(message: impl Into<String>) -> Self {
        ResponseMeta {
            updated_at: Utc::now(),
            stale: true,
            quota_exhausted: true,
            source: DataSource::Cache,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub data: Vec<Quote>,
    pub meta: ResponseMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub symbol: String,
    pub range: ChartRange,
    pub data: Vec<CandlePoint>,
    pub meta: ResponseMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsResponse {
    pub data: Vec<Headline>,
    pub meta: ResponseMeta,
}
