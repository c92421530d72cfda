//! Runtime configuration.
//!
//! Defaults live in constants; the server reads overrides from the
//! environment (a `.env` file is loaded first when present). CLI flags take
//! precedence over both.

use std::env;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Maximum accepted multipart body for `/api/analyze`.
///
/// 50 MB limit.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Buffered log entries per SSE subscriber.
pub const LOG_CHANNEL_CAPACITY: usize = 100;

/// Server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// Build from `ROWSCOPE_PORT` and `ROWSCOPE_MAX_UPLOAD_BYTES`.
    ///
    /// Unset variables keep their defaults. Unparseable ones are ignored
    /// with a warning.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: read_var(&lookup, "ROWSCOPE_PORT").unwrap_or(defaults.port),
            max_upload_bytes: read_var(&lookup, "ROWSCOPE_MAX_UPLOAD_BYTES")
                .unwrap_or(defaults.max_upload_bytes),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

fn read_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            crate::api::logs::log_warning(format!("Ignoring invalid {}='{}'", key, raw));
            None
        }
    }
}
