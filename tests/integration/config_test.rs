//! Configuration loading tests

use poly_collector::config::{Config, ConfigError};

#[test]
fn test_config_example_parses() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();
    assert_eq!(config.collector.markets.len(), 1);
    assert_eq!(config.collector.poll_interval_secs, 60);
    assert_eq!(config.collector.page_limit, 1000);
    assert!(config.validate().is_ok());
}

#[test]
fn test_empty_market_list_is_fatal() {
    let config: Config = toml::from_str(
        r#"
        [collector]
        markets = []
        "#,
    )
    .unwrap();
    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::NoMarkets));
    assert!(err.to_string().contains("POLYMARKET_MARKETS"));
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
        [collector]
        markets = ["0xabc"]
        poll_interval_secs = 5

        [data]
        data_dir = "/var/lib/collector"
        "#,
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.collector.markets, vec!["0xabc"]);
    assert_eq!(config.collector.poll_interval_secs, 5);
    assert_eq!(
        config.data.state_file(),
        std::path::PathBuf::from("/var/lib/collector/state.json")
    );
}
