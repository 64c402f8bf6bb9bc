use fisio_client::config::{ClientConfig, DEFAULT_API_URL, load_config_from, save_config_to};

#[test]
fn save_then_load_keeps_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");
    let config = ClientConfig {
        api_url: "https://api.clinic.example".to_string(),
        request_timeout_secs: 5,
        offline_latency_ms: 250,
        ..ClientConfig::default()
    };

    save_config_to(&path, &config).unwrap();
    let loaded = load_config_from(&path).unwrap();

    assert_eq!(loaded.api_url, "https://api.clinic.example");
    assert_eq!(loaded.request_timeout_secs, 5);
    assert_eq!(loaded.offline_latency_ms, 250);
    assert_eq!(loaded.config_version, 1);
}

#[test]
fn unversioned_config_is_migrated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "base_url": "http://10.0.0.5:3000" }"#).unwrap();

    let loaded = load_config_from(&path).unwrap();

    assert_eq!(loaded.api_url, "http://10.0.0.5:3000");
    assert_eq!(loaded.request_timeout_secs, 30);
    assert_eq!(loaded.config_version, 1);
}

#[test]
fn newer_config_version_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{ "config_version": 9, "api_url": "http://localhost:3000" }"#,
    )
    .unwrap();

    let err = load_config_from(&path).unwrap_err();
    assert!(err.to_string().contains("newer than this build supports"));
}

#[test]
fn missing_file_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config_from(&dir.path().join("absent.json")).unwrap_err();
    assert!(err.to_string().starts_with("config error"));
}

#[test]
fn defaults_point_at_local_api() {
    let config = ClientConfig::default();
    assert_eq!(config.api_url, DEFAULT_API_URL);
    assert_eq!(config.request_timeout().as_secs(), 30);
    assert!(config.offline_latency().is_zero());
}
