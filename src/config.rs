//! Server configuration.
//!
//! Values come from environment variables with built-in defaults. The optional
//! port argument on the command line overrides the configured port.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_ROOT: &str = "./www";
const DEFAULT_MAX_REQUEST_BYTES: usize = 8 * 1024;
const DEFAULT_READ_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_WRITE_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_MAX_RESPONSE_BYTES: u64 = 64 * 1024 * 1024;

/// Immutable settings shared by the listener and every connection handler.
#[derive(Debug, Clone)]
pub struct Config {
    /// Interface to bind.
    pub host: String,
    /// TCP port to bind.
    pub port: u16,
    /// Directory all served files must live under.
    pub root_dir: PathBuf,
    /// Upper bound on bytes read while looking for the request line and headers.
    pub max_request_bytes: usize,
    /// Idle time allowed between two reads from the client.
    pub read_timeout: Duration,
    /// Time allowed for writing the head, and for each chunk of the body.
    pub write_timeout: Duration,
    /// Largest file that will be sent as a response body.
    pub max_response_bytes: u64,
}

/// Rejected command-line input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidPort(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort(raw) => write!(f, "bad port number {raw}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// Missing keys use the defaults. Present but unparseable values are
    /// reported and replaced by the default as well.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HTTP_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let root_dir = lookup("RESOURCE_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT));

        Self {
            host,
            port: port_setting(&lookup),
            root_dir,
            max_request_bytes: setting(&lookup, "MAX_REQUEST_BYTES", DEFAULT_MAX_REQUEST_BYTES),
            read_timeout: Duration::from_millis(setting(
                &lookup,
                "READ_TIMEOUT_MS",
                DEFAULT_READ_TIMEOUT_MS,
            )),
            write_timeout: Duration::from_millis(setting(
                &lookup,
                "WRITE_TIMEOUT_MS",
                DEFAULT_WRITE_TIMEOUT_MS,
            )),
            max_response_bytes: setting(&lookup, "MAX_RESPONSE_BYTES", DEFAULT_MAX_RESPONSE_BYTES),
        }
    }

    /// Address to bind, as `host:port`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Validates the port given on the command line.
///
/// Anything that is not a number in `1..=65535` is rejected.
pub fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    match raw.trim().parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ConfigError::InvalidPort(raw.to_string())),
    }
}

fn port_setting<F>(lookup: &F) -> u16
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup("HTTP_PORT") else {
        return DEFAULT_PORT;
    };

    parse_port(&raw).unwrap_or_else(|e| {
        tracing::warn!(key = "HTTP_PORT", error = %e, default = DEFAULT_PORT, "Ignoring invalid setting");
        DEFAULT_PORT
    })
}

fn setting<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr + Copy + fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return default;
    };

    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(key, value = %raw, default = %default, "Ignoring invalid setting");
            default
        }
    }
}
