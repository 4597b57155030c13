use pretty_assertions::assert_eq;
use remap_config::{json_schema, ConfigError, RemapConfig, ScoreNormalization};

#[test]
fn empty_file_uses_defaults() {
    let config = RemapConfig::load_from_str("").unwrap();
    assert_eq!(config, RemapConfig::default());
    assert_eq!(config.index.library_packages, vec!["java", "javax"]);
    assert_eq!(config.matcher.likely_match_limit, 10);
    assert_eq!(
        config.matcher.score_normalization,
        ScoreNormalization::CombinedMaximum
    );
    assert!(config.matcher.parallel);
}

#[test]
fn loads_sections_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("remap.toml");
    std::fs::write(
        &path,
        r#"
[logging]
level = "debug"
json = true

[index]
library_packages = ["java", "com/vendor"]

[matcher]
score_normalization = "none"
likely_match_limit = 3
parallel = false
"#,
    )
    .unwrap();

    let config = RemapConfig::load_from_path(&path).unwrap();
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json);
    assert!(config.index.is_library_class("com/vendor/Widget"));
    assert_eq!(config.matcher.score_normalization, ScoreNormalization::None);
    assert_eq!(config.matcher.likely_match_limit, 3);
    assert!(!config.matcher.parallel);
}

#[test]
fn unknown_keys_are_rejected() {
    let err = RemapConfig::load_from_str("[matcher]\ncutoff = 3\n").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)), "{err}");
}

#[test]
fn zero_likely_match_limit_is_invalid() {
    let err = RemapConfig::load_from_str("[matcher]\nlikely_match_limit = 0\n").unwrap_err();
    assert!(
        matches!(
            err,
            ConfigError::Invalid {
                field: "matcher.likely_match_limit",
                ..
            }
        ),
        "{err}"
    );
}

#[test]
fn empty_library_prefix_is_invalid() {
    let err = RemapConfig::load_from_str("[index]\nlibrary_packages = [\"\"]\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }), "{err}");
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.toml");
    let err = RemapConfig::load_from_path(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("missing.toml"));
}

#[test]
fn schema_lists_every_section() {
    let schema = serde_json::to_value(json_schema()).unwrap();
    let properties = schema["properties"].as_object().unwrap();
    for section in ["logging", "index", "matcher"] {
        assert!(properties.contains_key(section), "missing {section}");
    }
}
