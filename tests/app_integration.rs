use std::fs;
use tracing::info;

use commodity_tracker::core::config::AppConfig;
use commodity_tracker::core::market::{ChartRange, DataSource};
use commodity_tracker::store::Store;
use commodity_tracker::{AppCommand, MarketData};

mod test_utils {
    use std::path::Path;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const USO_SERIES: &str = r#"{
        "Time Series (Daily)": {
            "2024-03-06": {"1. open": "75.50", "2. high": "76.40", "3. low": "75.00", "4. close": "76.00", "5. volume": "1300"},
            "2024-03-07": {"1. open": "76.00", "2. high": "77.20", "3. low": "75.90", "4. close": "77.00", "5. volume": "1500"}
        }
    }"#;

    pub const RATE_LIMIT_NOTE: &str =
        r#"{"Note": "Our standard API call frequency is 5 calls per minute"}"#;

    pub async fn mount_series(mock_server: &MockServer, ticker: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param("symbol", ticker))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(mock_server)
            .await;
    }

    pub async fn create_news_mock_server(status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    /// Writes a config with two tracked symbols pointing at the mock servers,
    /// caching on disk under `cache_dir`.
    pub fn write_config(
        alpha_uri: &str,
        news_uri: &str,
        cache_dir: &Path,
    ) -> tempfile::NamedTempFile {
        let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        let config_content = format!(
            r#"
cache:
  dir: "{}"
request_timeout_ms: 2000
symbols:
  - symbol: "WTI"
    name: "Crude Oil (WTI)"
    ticker: "USO"
    seed_price: 78.2
    news_query: "WTI crude oil"
  - symbol: "GOLD"
    name: "Gold"
    ticker: "GLD"
    seed_price: 2034.0
    news_query: "gold commodity prices"
providers:
  alpha_vantage:
    base_url: {alpha_uri}
  news_api:
    base_url: {news_uri}
"#,
            cache_dir.display()
        );
        std::fs::write(config_file.path(), config_content).expect("Failed to write config file");
        config_file
    }
}

#[test_log::test(tokio::test)]
async fn test_snapshot_with_quota_on_second_symbol() {
    let alpha = wiremock::MockServer::start().await;
    test_utils::mount_series(&alpha, "USO", test_utils::USO_SERIES).await;
    test_utils::mount_series(&alpha, "GLD", test_utils::RATE_LIMIT_NOTE).await;
    let news = test_utils::create_news_mock_server(200, r#"{"status": "ok", "articles": []}"#).await;

    let cache_dir = tempfile::TempDir::new().unwrap();
    let config_file = test_utils::write_config(&alpha.uri(), &news.uri(), cache_dir.path());
    let config = AppConfig::load_from_path(config_file.path()).unwrap();
    let data = MarketData::from_config(&config, &Store::in_memory())
        .await
        .unwrap();

    let snapshot = data.market.snapshot().await;
    info!(?snapshot, "Received snapshot");

    assert_eq!(snapshot.data.len(), 2);
    assert_eq!(snapshot.data[0].symbol, "WTI");
    assert_eq!(snapshot.data[0].price, 77.0);
    assert_eq!(snapshot.data[0].previous_close, 76.0);
    assert_eq!(snapshot.data[1].symbol, "GOLD");
    assert_eq!(snapshot.data[1].price, 2034.0);
    assert!(snapshot.meta.stale);
    assert!(snapshot.meta.quota_exhausted);
    assert_eq!(snapshot.meta.source, DataSource::Live);
    assert!(
        snapshot
            .meta
            .message
            .as_deref()
            .unwrap()
            .contains("call frequency")
    );

    // The GOLD quota also drives the history fallback, anchored to its seed
    let gold = config.tracked_symbol("GOLD").unwrap();
    let history = data.history.history(gold, ChartRange::OneMonth).await.unwrap();
    assert_eq!(history.data.len(), 60);
    assert_eq!(history.data[0].close, 2034.0);
    assert!(history.meta.quota_exhausted);
    assert_eq!(history.meta.source, DataSource::Cache);

    // WTI history is served live
    let wti = config.tracked_symbol("WTI").unwrap();
    let history = data.history.history(wti, ChartRange::OneDay).await.unwrap();
    assert_eq!(history.data.len(), 2);
    assert!(!history.meta.stale);
}

#[test_log::test(tokio::test)]
async fn test_history_fallback_uses_last_known_price() {
    let alpha = wiremock::MockServer::start().await;
    // First request succeeds, every later one is rate limited
    wiremock::Mock::given(wiremock::matchers::path("/query"))
        .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(test_utils::USO_SERIES))
        .up_to_n_times(1)
        .mount(&alpha)
        .await;
    wiremock::Mock::given(wiremock::matchers::path("/query"))
        .respond_with(wiremock::ResponseTemplate::new(429))
        .mount(&alpha)
        .await;
    let news = test_utils::create_news_mock_server(200, r#"{"status": "ok", "articles": []}"#).await;

    let cache_dir = tempfile::TempDir::new().unwrap();
    let config_file = test_utils::write_config(&alpha.uri(), &news.uri(), cache_dir.path());
    let config = AppConfig::load_from_path(config_file.path()).unwrap();
    let data = MarketData::from_config(&config, &Store::in_memory())
        .await
        .unwrap();

    let snapshot = data.market.snapshot().await;
    assert_eq!(snapshot.data[0].price, 77.0);
    assert_eq!(
        snapshot.meta.message.as_deref(),
        Some("HTTP 429 from data provider")
    );

    let wti = config.tracked_symbol("WTI").unwrap();
    let history = data.history.history(wti, ChartRange::OneYear).await.unwrap();
    assert_eq!(history.data.len(), 60);
    assert_eq!(history.data[0].close, 77.0);
    assert!(history.meta.stale);
}

#[test_log::test(tokio::test)]
async fn test_news_quota_is_cached() {
    let alpha = wiremock::MockServer::start().await;
    let news = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::path("/v2/everything"))
        .respond_with(wiremock::ResponseTemplate::new(429))
        .expect(1)
        .mount(&news)
        .await;

    let cache_dir = tempfile::TempDir::new().unwrap();
    let config_file = test_utils::write_config(&alpha.uri(), &news.uri(), cache_dir.path());
    let config = AppConfig::load_from_path(config_file.path()).unwrap();
    let data = MarketData::from_config(&config, &Store::in_memory())
        .await
        .unwrap();
    let wti = config.tracked_symbol("WTI").unwrap();

    let first = data.news.news(wti).await.unwrap();
    let second = data.news.news(wti).await.unwrap();

    assert!(first.data.is_empty());
    assert!(first.meta.stale);
    assert!(first.meta.quota_exhausted);
    assert_eq!(first, second);
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let alpha = wiremock::MockServer::start().await;
    test_utils::mount_series(&alpha, "USO", test_utils::USO_SERIES).await;
    test_utils::mount_series(&alpha, "GLD", test_utils::USO_SERIES).await;
    let news = test_utils::create_news_mock_server(
        200,
        r#"{"status": "ok", "articles": [{
            "title": "Oil steadies",
            "url": "https://example.com/oil",
            "publishedAt": "2024-03-07T10:15:00Z",
            "source": {"name": "Example Wire"}
        }]}"#,
    )
    .await;

    let cache_dir = tempfile::TempDir::new().unwrap();
    let config_file = test_utils::write_config(&alpha.uri(), &news.uri(), cache_dir.path());
    let config_path = config_file.path().to_str().unwrap();

    for (command, json) in [
        (AppCommand::Snapshot, false),
        (
            AppCommand::History {
                symbol: "wti".to_string(),
                range: "5d".to_string(),
            },
            true,
        ),
        (
            AppCommand::News {
                symbol: "WTI".to_string(),
            },
            false,
        ),
    ] {
        let result = commodity_tracker::run_command(command, Some(config_path), json).await;
        assert!(
            result.is_ok(),
            "Command failed with: {:?}",
            result.err()
        );
    }
}

#[test_log::test(tokio::test)]
async fn test_invalid_input_rejected_before_provider_call() {
    let alpha = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::any())
        .respond_with(wiremock::ResponseTemplate::new(200))
        .expect(0)
        .mount(&alpha)
        .await;

    let cache_dir = tempfile::TempDir::new().unwrap();
    let config_file = test_utils::write_config(&alpha.uri(), &alpha.uri(), cache_dir.path());
    let config_path = config_file.path().to_str().unwrap();

    let unknown_symbol = commodity_tracker::run_command(
        AppCommand::History {
            symbol: "PLATINUM".to_string(),
            range: "1M".to_string(),
        },
        Some(config_path),
        true,
    )
    .await;
    assert_eq!(
        unknown_symbol.unwrap_err().to_string(),
        "Unsupported commodity symbol: PLATINUM"
    );

    let unknown_range = commodity_tracker::run_command(
        AppCommand::History {
            symbol: "WTI".to_string(),
            range: "2W".to_string(),
        },
        Some(config_path),
        true,
    )
    .await;
    assert_eq!(
        unknown_range.unwrap_err().to_string(),
        "Unsupported chart range: 2W"
    );
}

#[test_log::test(tokio::test)]
async fn test_history_failure_surfaces_to_caller() {
    let alpha = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::path("/query"))
        .respond_with(wiremock::ResponseTemplate::new(503))
        .mount(&alpha)
        .await;

    let cache_dir = tempfile::TempDir::new().unwrap();
    let config_file = test_utils::write_config(&alpha.uri(), &alpha.uri(), cache_dir.path());
    let result = commodity_tracker::run_command(
        AppCommand::History {
            symbol: "GOLD".to_string(),
            range: "3M".to_string(),
        },
        Some(config_file.path().to_str().unwrap()),
        true,
    )
    .await;

    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "Failed to fetch 3M history for GOLD");
    assert_eq!(
        err.root_cause().to_string(),
        "Provider request failed with status 503"
    );
}

#[test_log::test(tokio::test)]
async fn test_repeated_snapshot_runs_reuse_disk_cache() {
    let alpha = wiremock::MockServer::start().await;
    test_utils::mount_series(&alpha, "USO", test_utils::USO_SERIES).await;
    test_utils::mount_series(&alpha, "GLD", test_utils::USO_SERIES).await;

    let cache_dir = tempfile::TempDir::new().unwrap();
    let config_file = test_utils::write_config(&alpha.uri(), &alpha.uri(), cache_dir.path());
    let config_path = config_file.path().to_str().unwrap();

    for _ in 0..2 {
        commodity_tracker::run_command(AppCommand::Snapshot, Some(config_path), true)
            .await
            .unwrap();
    }

    // One request per tracked symbol, all from the first run
    let requests = alpha.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[test_log::test(tokio::test)]
async fn test_last_known_price_survives_restart() {
    let alpha = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::path("/query"))
        .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(test_utils::USO_SERIES))
        .up_to_n_times(1)
        .mount(&alpha)
        .await;
    wiremock::Mock::given(wiremock::matchers::path("/query"))
        .respond_with(wiremock::ResponseTemplate::new(429))
        .mount(&alpha)
        .await;

    let cache_dir = tempfile::TempDir::new().unwrap();
    let config_file = test_utils::write_config(&alpha.uri(), &alpha.uri(), cache_dir.path());
    let config = AppConfig::load_from_path(config_file.path()).unwrap();

    {
        let store = Store::from_config(&config).unwrap();
        assert!(store.is_persistent());
        let data = MarketData::from_config(&config, &store).await.unwrap();
        let snapshot = data.market.snapshot().await;
        assert_eq!(snapshot.data[0].price, 77.0);
    }

    // A fresh store over the same directory sees the recorded WTI price
    let store = Store::from_config(&config).unwrap();
    let data = MarketData::from_config(&config, &store).await.unwrap();
    let wti = config.tracked_symbol("WTI").unwrap();
    let history = data.history.history(wti, ChartRange::OneMonth).await.unwrap();
    assert!(history.meta.quota_exhausted);
    assert_eq!(history.data[0].close, 77.0);

    let snapshot = data.market.snapshot().await;
    assert_eq!(snapshot.data[0].price, 77.0);
    assert!(snapshot.meta.quota_exhausted);
}

#[test]
fn test_missing_config_file_is_an_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("absent.yaml");
    let result = AppConfig::load_from_path(&path);
    assert!(result.is_err());
    assert!(!fs::exists(&path).unwrap());
}
