//! Runtime configuration read from `CIVIC_*` environment variables.
//!
//! `main` loads a `.env` file first (if present), so every variable can also
//! live there.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::error::AppError;

const DEFAULT_ADDR: &str = "0.0.0.0:8787";
const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8787/uploads";
const DEFAULT_ANALYSIS_DELAY_MS: u64 = 1500;
const DEFAULT_CLASSIFIER_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SUBMIT_LIMIT: usize = 10;
const DEFAULT_SUBMIT_WINDOW_SECS: u64 = 60;
const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Which classifier backs submissions.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifierConfig {
    /// Keyword heuristic in process, after a simulated delay.
    Local { delay: Duration },
    /// External classification endpoint.
    Remote {
        endpoint: Url,
        auth_token: Option<String>,
        timeout: Duration,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub data_dir: PathBuf,
    /// Prefix of the URLs handed out for uploaded photos.
    pub public_base_url: String,
    pub classifier: ClassifierConfig,
    pub submit_limit: usize,
    pub submit_window: Duration,
    pub max_image_bytes: usize,
    pub log_json: bool,
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError>
where
    T::Err: std::fmt::Display,
{
    match var(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| AppError::Config(format!("{} has invalid value '{}': {}", name, raw, e))),
        None => Ok(default),
    }
}

fn parse_bool(name: &str) -> Result<bool, AppError> {
    match var(name).map(|v| v.to_ascii_lowercase()).as_deref() {
        None | Some("0") | Some("false") | Some("no") => Ok(false),
        Some("1") | Some("true") | Some("yes") => Ok(true),
        Some(other) => Err(AppError::Config(format!("{} must be a boolean, got '{}'", name, other))),
    }
}

impl ClassifierConfig {
    fn from_env() -> Result<Self, AppError> {
        let kind = var("CIVIC_CLASSIFIER").unwrap_or_else(|| "local".to_string());

        match kind.as_str() {
            "local" => Ok(ClassifierConfig::Local {
                delay: Duration::from_millis(parse_var("CIVIC_ANALYSIS_DELAY_MS", DEFAULT_ANALYSIS_DELAY_MS)?),
            }),
            "remote" => {
                let raw_url = var("CIVIC_CLASSIFIER_URL").ok_or_else(|| {
                    AppError::Config("CIVIC_CLASSIFIER_URL is required when CIVIC_CLASSIFIER=remote".to_string())
                })?;
                Ok(ClassifierConfig::Remote {
                    endpoint: Url::parse(&raw_url)?,
                    auth_token: var("CIVIC_CLASSIFIER_TOKEN"),
                    timeout: Duration::from_secs(parse_var(
                        "CIVIC_CLASSIFIER_TIMEOUT_SECS",
                        DEFAULT_CLASSIFIER_TIMEOUT_SECS,
                    )?),
                })
            }
            other => Err(AppError::Config(format!(
                "CIVIC_CLASSIFIER must be 'local' or 'remote', got '{}'",
                other
            ))),
        }
    }
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        let submit_limit = parse_var("CIVIC_SUBMIT_LIMIT", DEFAULT_SUBMIT_LIMIT)?;
        if submit_limit == 0 {
            return Err(AppError::Config("CIVIC_SUBMIT_LIMIT must be at least 1".to_string()));
        }

        Ok(Self {
            bind_addr: var("CIVIC_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string()),
            data_dir: PathBuf::from(var("CIVIC_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())),
            public_base_url: var("CIVIC_PUBLIC_BASE_URL").unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_string()),
            classifier: ClassifierConfig::from_env()?,
            submit_limit,
            submit_window: Duration::from_secs(parse_var("CIVIC_SUBMIT_WINDOW_SECS", DEFAULT_SUBMIT_WINDOW_SECS)?),
            max_image_bytes: parse_var("CIVIC_MAX_IMAGE_BYTES", DEFAULT_MAX_IMAGE_BYTES)?,
            log_json: parse_bool("CIVIC_LOG_JSON")?,
        })
    }
}
