//! Service configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Every key has a default, so a bare
//! `rollcall` starts a local picker on `127.0.0.1:3000` with its data in
//! `./data`.

use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::{DEFAULT_CLASS_ID, normalize_whitespace};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, multi-line.
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Top-level service configuration.
///
/// Loaded once at startup via [`PickerConfig::from_env`].
#[derive(Debug, Clone)]
pub struct PickerConfig {
    /// Socket address to bind the HTTP server to.
    pub listen_addr: SocketAddr,

    /// Directory holding one JSON document per class.
    pub data_dir: PathBuf,

    /// Class opened when no previous class was recorded.
    pub default_class_id: String,

    /// Capacity of the EventBus broadcast channel.
    pub event_bus_capacity: usize,

    /// Whether the OCR worker is started.
    pub ocr_enabled: bool,

    /// OCR program reading an image on stdin and writing text to stdout.
    pub ocr_command: String,

    /// Arguments passed to [`Self::ocr_command`].
    pub ocr_args: Vec<String>,

    /// Per-request OCR timeout in seconds.
    pub ocr_timeout_secs: u64,

    /// HTTP request timeout in seconds. Must exceed the OCR timeout.
    pub request_timeout_secs: u64,

    /// Largest accepted request body (imports, images), in bytes.
    pub max_upload_bytes: usize,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            data_dir: PathBuf::from("./data"),
            default_class_id: DEFAULT_CLASS_ID.to_string(),
            event_bus_capacity: 1024,
            ocr_enabled: true,
            ocr_command: "tesseract".to_string(),
            ocr_args: vec!["stdin".to_string(), "stdout".to_string()],
            ocr_timeout_secs: 60,
            request_timeout_secs: 90,
            max_upload_bytes: 10 * 1024 * 1024,
            log_format: LogFormat::Pretty,
        }
    }
}

impl PickerConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to the [`Default`] value for every variable that is not
    /// set or cannot be parsed. Calls `dotenvy::dotenv().ok()` to
    /// optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, AddrParseError> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr = match std::env::var("LISTEN_ADDR") {
            Ok(addr) => addr.parse()?,
            Err(_) => defaults.listen_addr,
        };

        let data_dir = std::env::var("DATA_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map_or(defaults.data_dir, PathBuf::from);
        let default_class_id = std::env::var("DEFAULT_CLASS_ID")
            .ok()
            .map(|v| normalize_whitespace(&v))
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.default_class_id);

        let event_bus_capacity = parse_env("EVENT_BUS_CAPACITY", defaults.event_bus_capacity);

        let ocr_enabled = parse_env_bool("OCR_ENABLED", defaults.ocr_enabled);
        let ocr_command = std::env::var("OCR_COMMAND")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.ocr_command);
        let ocr_args = std::env::var("OCR_ARGS")
            .map(|v| v.split_whitespace().map(str::to_string).collect())
            .unwrap_or(defaults.ocr_args);
        let ocr_timeout_secs = parse_env("OCR_TIMEOUT_SECS", defaults.ocr_timeout_secs).max(1);
        let request_timeout_secs =
            parse_env("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs).max(1);
        let max_upload_bytes = parse_env("MAX_UPLOAD_BYTES", defaults.max_upload_bytes);

        let log_format = std::env::var("LOG_FORMAT")
            .ok()
            .and_then(|v| LogFormat::parse(&v))
            .unwrap_or(defaults.log_format);

        Ok(Self {
            listen_addr,
            data_dir,
            default_class_id,
            event_bus_capacity,
            ocr_enabled,
            ocr_command,
            ocr_args,
            ocr_timeout_secs,
            request_timeout_secs,
            max_upload_bytes,
            log_format,
        })
    }

    /// OCR timeout as a [`Duration`].
    #[must_use]
    pub const fn ocr_timeout(&self) -> Duration {
        Duration::from_secs(self.ocr_timeout_secs)
    }

    /// HTTP request timeout as a [`Duration`].
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key)
        .ok()
        .map(|v| v.trim().to_ascii_lowercase())
        .as_deref()
    {
        Some("true" | "1") => true,
        Some("false" | "0") => false,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = PickerConfig::default();
        assert_eq!(config.listen_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.default_class_id, "default");
        assert_eq!(config.ocr_args, ["stdin", "stdout"]);
        assert_eq!(config.ocr_timeout(), Duration::from_secs(60));
        assert!(config.request_timeout() > config.ocr_timeout());
        assert_eq!(config.max_upload_bytes, 10_485_760);
    }

    #[test]
    fn log_format_parsing() {
        assert_eq!(LogFormat::parse("JSON"), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse(" pretty "), Some(LogFormat::Pretty));
        assert_eq!(LogFormat::parse("xml"), None);
    }

    #[test]
    fn unset_variables_fall_back() {
        assert_eq!(parse_env("ROLLCALL_TEST_UNSET_NUMBER", 7_u64), 7);
        assert!(parse_env_bool("ROLLCALL_TEST_UNSET_FLAG", true));
    }
}
