pub mod config;
pub mod structured_logging;

pub use config::{
    AppConfig, ConfigError, ConfigResult, GeminiSettings, LoggingSettings, RecognitionSettings,
    SupabaseSettings,
};
pub use structured_logging::{
    init_structured_logging, ExecutionContext, JsonFormatter, LogFormat, LoggingConfig,
    OperationTimer, PerformanceMetrics, StructuredLogEntry,
};
