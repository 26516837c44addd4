//! Application configuration
//!
//! Resolution order: built-in defaults, then an optional TOML file, then
//! environment variables (a `.env` file in the working directory is loaded
//! first).

use crate::structured_logging::LogFormat;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_LIVE_URL: &str = "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent";
pub const DEFAULT_BUCKET: &str = "parts-images";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub supabase: SupabaseSettings,
    pub gemini: GeminiSettings,
    pub recognition: RecognitionSettings,
    pub logging: LoggingSettings,
    /// File the values were read from, if any
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupabaseSettings {
    pub url: Option<String>,
    pub key: Option<String>,
    pub bucket: String,
}

impl Default for SupabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            key: None,
            bucket: DEFAULT_BUCKET.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub live_url: String,
    pub recognition_model: String,
    pub chat_model: String,
    pub live_model: String,
    pub timeout_secs: u64,
    /// Retries for chat turns; recognition never retries
    pub chat_retries: u32,
    pub thinking_budget: u32,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            live_url: DEFAULT_GEMINI_LIVE_URL.to_string(),
            recognition_model: "gemini-3-flash-preview".to_string(),
            chat_model: "gemini-3-pro-preview".to_string(),
            live_model: "gemini-2.5-flash-native-audio-preview-12-2025".to_string(),
            timeout_secs: 60,
            chat_retries: 2,
            thinking_budget: 16384,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionSettings {
    pub max_references: usize,
    /// Language the model writes reasons and feature descriptions in
    pub language: String,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            max_references: 8,
            language: "Brazilian Portuguese".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Load from defaults, the config file and the process environment.
    ///
    /// `explicit` wins over `$AIDENTIFY_CONFIG`, which wins over the per-user
    /// config file. Only an explicitly named file must exist.
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        dotenv::dotenv().ok();

        let mut config = match Self::resolve_file(explicit) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| env::var(key).ok())?;
        Ok(config)
    }

    fn resolve_file(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Ok(path) = env::var("AIDENTIFY_CONFIG") {
            return Some(PathBuf::from(path));
        }
        let user_file = dirs::config_dir()?.join("aidentify").join("config.toml");
        user_file.exists().then_some(user_file)
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Overlay environment values. `lookup` abstracts the environment so the
    /// overlay can be exercised without touching process state.
    pub fn apply_env<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("SUPABASE_URL") {
            self.supabase.url = Some(v.trim().trim_end_matches('/').to_string());
        }
        if let Some(v) = get("SUPABASE_KEY") {
            self.supabase.key = Some(v.trim().to_string());
        }
        if let Some(v) = get("SUPABASE_BUCKET") {
            self.supabase.bucket = v;
        }

        if let Some(v) = get("GEMINI_API_KEY").or_else(|| get("API_KEY")) {
            self.gemini.api_key = Some(v.trim().to_string());
        }
        if let Some(v) = get("GEMINI_BASE_URL") {
            self.gemini.base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = get("GEMINI_LIVE_URL") {
            self.gemini.live_url = v;
        }
        if let Some(v) = get("AIDENTIFY_RECOGNITION_MODEL") {
            self.gemini.recognition_model = v;
        }
        if let Some(v) = get("AIDENTIFY_CHAT_MODEL") {
            self.gemini.chat_model = v;
        }
        if let Some(v) = get("AIDENTIFY_LIVE_MODEL") {
            self.gemini.live_model = v;
        }
        if let Some(v) = get("AIDENTIFY_TIMEOUT_SECS") {
            self.gemini.timeout_secs = parse_value("AIDENTIFY_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("AIDENTIFY_CHAT_RETRIES") {
            self.gemini.chat_retries = parse_value("AIDENTIFY_CHAT_RETRIES", &v)?;
        }
        if let Some(v) = get("AIDENTIFY_THINKING_BUDGET") {
            self.gemini.thinking_budget = parse_value("AIDENTIFY_THINKING_BUDGET", &v)?;
        }

        if let Some(v) = get("AIDENTIFY_MAX_REFERENCES") {
            self.recognition.max_references = parse_value("AIDENTIFY_MAX_REFERENCES", &v)?;
        }
        if let Some(v) = get("AIDENTIFY_LANGUAGE") {
            self.recognition.language = v;
        }

        if let Some(v) = get("AIDENTIFY_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = get("AIDENTIFY_LOG_FORMAT") {
            self.logging.format = v.parse().map_err(|reason| ConfigError::InvalidValue {
                key: "AIDENTIFY_LOG_FORMAT".to_string(),
                value: v.clone(),
                reason,
            })?;
        }

        debug!(
            supabase_configured = self.supabase_configured(),
            gemini_key_present = self.gemini.api_key.is_some(),
            "Environment overlay applied"
        );
        Ok(())
    }

    /// Both Supabase URL and key are present
    pub fn supabase_configured(&self) -> bool {
        self.supabase.url.is_some() && self.supabase.key.is_some()
    }
}

fn parse_value<T>(key: &str, raw: &str) -> ConfigResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
