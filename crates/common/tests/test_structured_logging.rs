use common::{
    init_structured_logging, AppConfig, ExecutionContext, LogFormat, LoggingConfig,
    OperationTimer, StructuredLogEntry,
};
use serde_json::{Map, Value};
use std::io::Write;

#[test]
fn test_structured_log_entry_creation() {
    let mut fields = Map::new();
    fields.insert("references".to_string(), Value::from(4));

    let entry = StructuredLogEntry {
        timestamp: chrono::Utc::now().to_rfc3339(),
        level: "WARN".to_string(),
        target: "recognition".to_string(),
        message: "Reference photo skipped".to_string(),
        fields,
        context: None,
        performance: None,
    };

    let json = serde_json::to_string(&entry).unwrap();
    assert!(json.contains("\"references\":4"));
    assert!(!json.contains("context"));
    assert!(!json.contains("performance"));
}

#[test]
fn test_execution_context_capture() {
    let context = ExecutionContext::capture();
    assert_eq!(context.pid, std::process::id());
    assert!(!context.app_version.is_empty());
    assert!(!context.hostname.is_empty());
}

#[test]
fn test_init_json_logging_once() {
    let config = LoggingConfig::default()
        .with_level_name("debug")
        .with_format(LogFormat::Json);

    assert!(init_structured_logging(config).is_ok());
    tracing::info!(items_count = 3u64, "JSON logging active");

    let mut timer = OperationTimer::new("catalog_list");
    timer.add_field("rows", 3);
    let failed: Result<(), String> = Err("network down".to_string());
    timer.finish_with_result(&failed);

    // a second global subscriber is refused
    assert!(init_structured_logging(LoggingConfig::default()).is_err());
}

#[test]
fn test_config_file_feeds_logging_settings() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[logging]\nlevel = \"warn\"\nformat = \"json\"").unwrap();

    let config = AppConfig::from_file(file.path()).unwrap();
    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.logging.format, LogFormat::Json);
}
