use remap_config::{init_tracing, LoggingConfig};

// The subscriber is process-global, so this binary installs it exactly once.
#[test]
fn events_reach_the_configured_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("remap.log");
    let config = LoggingConfig {
        level: "config=debug,warn".to_owned(),
        json: false,
        stderr: false,
        file: Some(path.clone()),
    };

    init_tracing(&config);
    init_tracing(&LoggingConfig::default());
    tracing::debug!(target: "remap.config", classes = 3, "loaded package");
    tracing::info!(target: "remap.convert", "filtered out");

    let log = std::fs::read_to_string(&path).unwrap();
    assert!(log.contains("loaded package"), "log was: {log:?}");
    assert!(log.contains("classes=3"), "log was: {log:?}");
    assert!(!log.contains("filtered out"), "log was: {log:?}");
}
