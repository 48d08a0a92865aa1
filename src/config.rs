use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::util::{is_local_endpoint_url, parse_bool_flag};

pub const DEFAULT_API_URL: &str = "http://localhost:5000/generate";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

const API_URL_ENV: &str = "MEISH_API_URL";
const ALLOW_INSECURE_ENV: &str = "MEISH_ALLOW_INSECURE";
const CONNECT_TIMEOUT_ENV: &str = "MEISH_CONNECT_TIMEOUT_SECS";
const LOG_PATH_ENV: &str = "MEISH_LOG_PATH";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_url: String,
    pub allow_insecure: bool,
    pub connect_timeout_secs: u64,
    pub log_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            allow_insecure: false,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            log_path: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let api_url = std::env::var(API_URL_ENV)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let allow_insecure = std::env::var(ALLOW_INSECURE_ENV)
            .ok()
            .and_then(parse_bool_flag)
            .unwrap_or(false);
        let connect_timeout_secs = match std::env::var(CONNECT_TIMEOUT_ENV) {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid {CONNECT_TIMEOUT_ENV} '{raw}'"))?,
            Err(_) => DEFAULT_CONNECT_TIMEOUT_SECS,
        };
        let log_path = std::env::var(LOG_PATH_ENV)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            api_url,
            allow_insecure,
            connect_timeout_secs,
            log_path,
        })
    }

    pub fn validate(&self) -> Result<()> {
        let is_https = self.api_url.starts_with("https://");
        if !is_https && !self.api_url.starts_with("http://") {
            bail!(
                "Invalid {API_URL_ENV} '{}': expected http:// or https:// URL",
                self.api_url
            );
        }

        if !is_https && !self.allow_insecure && !self.is_local_endpoint() {
            bail!(
                "Refusing plain http for remote endpoint '{}'; use https or set {ALLOW_INSECURE_ENV}=1",
                self.api_url
            );
        }

        if self.connect_timeout_secs == 0 {
            bail!("{CONNECT_TIMEOUT_ENV} must be greater than zero");
        }

        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    fn is_local_endpoint(&self) -> bool {
        is_local_endpoint_url(&self.api_url)
    }
}
