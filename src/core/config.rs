use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

use super::error::ValidationError;

/// A commodity the service tracks, with everything providers need to fetch it.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TrackedSymbol {
    pub symbol: String,
    pub name: String,
    /// Exchange traded proxy used for price data
    pub ticker: String,
    /// Price served before the first successful fetch
    pub seed_price: f64,
    pub news_query: String,
}

impl TrackedSymbol {
    fn new(symbol: &str, name: &str, ticker: &str, seed_price: f64, news_query: &str) -> Self {
        TrackedSymbol {
            symbol: symbol.to_string(),
            name: name.to_string(),
            ticker: ticker.to_string(),
            seed_price,
            news_query: news_query.to_string(),
        }
    }
}

fn default_symbols() -> Vec<TrackedSymbol> {
    vec![
        TrackedSymbol::new(
            "WTI",
            "Crude Oil (WTI)",
            "USO",
            78.2,
            "WTI crude oil OR West Texas Intermediate",
        ),
        TrackedSymbol::new("BRENT", "Crude Oil (Brent)", "BNO", 81.1, "Brent crude"),
        TrackedSymbol::new(
            "NATURAL_GAS",
            "Natural Gas",
            "UNG",
            2.2,
            "natural gas prices",
        ),
        TrackedSymbol::new("GOLD", "Gold", "GLD", 2034.0, "gold commodity prices"),
        TrackedSymbol::new("SILVER", "Silver", "SLV", 23.2, "silver commodity prices"),
        TrackedSymbol::new("COPPER", "Copper", "CPER", 4.1, "copper commodity prices"),
        TrackedSymbol::new("WHEAT", "Wheat", "WEAT", 5.8, "wheat commodity prices"),
    ]
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub snapshot_ttl_secs: u64,
    pub history_ttl_secs: u64,
    pub news_ttl_secs: u64,
    /// Keep responses and last known prices on disk between runs
    pub persist: bool,
    /// Overrides the on-disk cache location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            snapshot_ttl_secs: 300,
            history_ttl_secs: 1800,
            news_ttl_secs: 300,
            persist: true,
            dir: None,
        }
    }
}

impl CacheConfig {
    pub fn snapshot_ttl(&self) -> Duration {
        Duration::from_secs(self.snapshot_ttl_secs)
    }

    pub fn history_ttl(&self) -> Duration {
        Duration::from_secs(self.history_ttl_secs)
    }

    pub fn news_ttl(&self) -> Duration {
        Duration::from_secs(self.news_ttl_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProviderEndpoint {
    pub base_url: String,
    #[serde(default = "default_api_key")]
    pub api_key: String,
}

fn default_api_key() -> String {
    "demo".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ProvidersConfig {
    pub alpha_vantage: ProviderEndpoint,
    pub news_api: ProviderEndpoint,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            alpha_vantage: ProviderEndpoint {
                base_url: "https://www.alphavantage.co".to_string(),
                api_key: default_api_key(),
            },
            news_api: ProviderEndpoint {
                base_url: "https://newsapi.org".to_string(),
                api_key: default_api_key(),
            },
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub cache: CacheConfig,
    pub request_timeout_ms: u64,
    pub symbols: Vec<TrackedSymbol>,
    pub providers: ProvidersConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            cache: CacheConfig::default(),
            request_timeout_ms: 12_000,
            symbols: default_symbols(),
            providers: ProvidersConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the config at the default location, falling back to built-in defaults
    /// when no file has been created yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default().with_env_overrides());
        }
        Self::load_from_path(&config_path)
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("io", "commodity-tracker", "commodity-tracker")
            .context("Could not determine project directories")
    }

    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.yaml"))
    }

    pub fn default_cache_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.cache_dir().to_path_buf())
    }

    /// Directory of the on-disk cache, `None` when persistence is disabled.
    pub fn cache_path(&self) -> Result<Option<PathBuf>> {
        if !self.cache.persist {
            return Ok(None);
        }
        match &self.cache.dir {
            Some(dir) => Ok(Some(dir.clone())),
            None => Self::default_cache_path().map(Some),
        }
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config = Self::from_yaml(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config.with_env_overrides())
    }

    fn from_yaml(config_str: &str) -> Result<Self> {
        // serde_yaml reads an empty document as null rather than an empty map
        if config_str.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(config_str)?;
        if config.symbols.is_empty() {
            anyhow::bail!("At least one tracked symbol is required");
        }
        if config.request_timeout_ms == 0 {
            anyhow::bail!("request_timeout_ms must be greater than zero");
        }
        Ok(config)
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("ALPHA_VANTAGE_API_KEY") {
            if !key.is_empty() {
                self.providers.alpha_vantage.api_key = key;
            }
        }
        if let Ok(key) = std::env::var("NEWS_API_KEY") {
            if !key.is_empty() {
                self.providers.news_api.api_key = key;
            }
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Resolves user input to a tracked symbol, case-insensitively.
    pub fn tracked_symbol(&self, symbol: &str) -> Result<&TrackedSymbol, ValidationError> {
        let wanted = symbol.trim().to_uppercase();
        self.symbols
            .iter()
            .find(|s| s.symbol == wanted)
            .ok_or_else(|| ValidationError::UnknownSymbol(symbol.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
cache:
  snapshot_ttl_secs: 60
  news_ttl_secs: 120
request_timeout_ms: 2500
symbols:
  - symbol: "GOLD"
    name: "Gold"
    ticker: "GLD"
    seed_price: 2034.0
    news_query: "gold commodity prices"
  - symbol: "WHEAT"
    name: "Wheat"
    ticker: "WEAT"
    seed_price: 5.8
    news_query: "wheat commodity prices"
providers:
  alpha_vantage:
    base_url: "http://example.com/alpha"
    api_key: "secret"
  news_api:
    base_url: "http://example.com/news"
"#;

        let config = AppConfig::from_yaml(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.cache.snapshot_ttl_secs, 60);
        assert_eq!(config.cache.history_ttl_secs, 1800);
        assert_eq!(config.cache.news_ttl(), Duration::from_secs(120));
        assert_eq!(config.request_timeout(), Duration::from_millis(2500));
        assert_eq!(config.symbols.len(), 2);
        assert_eq!(config.symbols[0].symbol, "GOLD");
        assert_eq!(config.symbols[1].seed_price, 5.8);
        assert_eq!(
            config.providers.alpha_vantage.base_url,
            "http://example.com/alpha"
        );
        assert_eq!(config.providers.alpha_vantage.api_key, "secret");
        assert_eq!(config.providers.news_api.api_key, "demo");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_yaml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.symbols.len(), 7);
        assert_eq!(config.symbols[0].symbol, "WTI");
        assert_eq!(config.request_timeout_ms, 12_000);
    }

    #[test]
    fn test_empty_symbol_list_rejected() {
        let result = AppConfig::from_yaml("symbols: []");
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_request_timeout_rejected() {
        let err = AppConfig::from_yaml("request_timeout_ms: 0").unwrap_err();
        assert_eq!(err.to_string(), "request_timeout_ms must be greater than zero");

        let config = AppConfig::from_yaml("request_timeout_ms: 1").unwrap();
        assert_eq!(config.request_timeout(), Duration::from_millis(1));
    }

    #[test]
    fn test_cache_path() -> Result<()> {
        let config = AppConfig::from_yaml("cache:\n  dir: /tmp/commodity-cache\n")?;
        assert_eq!(
            config.cache_path()?,
            Some(PathBuf::from("/tmp/commodity-cache"))
        );

        let config = AppConfig::from_yaml("cache:\n  persist: false\n  dir: /tmp/x\n")?;
        assert_eq!(config.cache_path()?, None);
        Ok(())
    }

    #[test]
    fn test_tracked_symbol_lookup() {
        let config = AppConfig::default();
        assert_eq!(config.tracked_symbol("gold").unwrap().ticker, "GLD");
        assert_eq!(
            config.tracked_symbol("PLATINUM"),
            Err(ValidationError::UnknownSymbol("PLATINUM".to_string()))
        );
    }

    #[test]
    fn test_load_from_path() -> Result<()> {
        let file = tempfile::NamedTempFile::new()?;
        fs::write(file.path(), "request_timeout_ms: 500\n")?;
        let config = AppConfig::load_from_path(file.path())?;
        assert_eq!(config.request_timeout_ms, 500);
        assert_eq!(config.cache, CacheConfig::default());
        Ok(())
    }
}
