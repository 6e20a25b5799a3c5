//! Support for library configuration options

use std::error::Error;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use once_cell::sync::Lazy;
use url::Url;

use crate::deadlines::MarkerPolicy;

/// The product name, that is sent as the HTTP user agent (along with the crate version).
/// Feel free to override it when initing this library.
pub static PRODUCT_NAME: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("DeadlineBoard".to_string())));

pub const ENV_API_URL: &str = "DEADLINE_BOARD_API_URL";
pub const ENV_API_KEY: &str = "DEADLINE_BOARD_API_KEY";
pub const ENV_DATA_DIR: &str = "DEADLINE_BOARD_DATA_DIR";
pub const ENV_PERSIST_TIMEOUT_MS: &str = "DEADLINE_BOARD_PERSIST_TIMEOUT_MS";
pub const ENV_HTTP_TIMEOUT_MS: &str = "DEADLINE_BOARD_HTTP_TIMEOUT_MS";
pub const ENV_MARKERS: &str = "DEADLINE_BOARD_MARKERS";

const DEFAULT_PERSIST_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;

/// Runtime settings. Endpoints and credentials are never hard-coded, they come from the environment
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// The base URL of the task API. `None` in case it has not been configured
    pub api_url: Option<Url>,
    pub api_key: Option<String>,
    /// Where the local data (deadlines, theme, streak) is stored
    pub data_dir: PathBuf,
    pub persist_timeout: Duration,
    pub http_timeout: Duration,
    pub marker_policy: MarkerPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            data_dir: default_data_dir(),
            persist_timeout: Duration::from_millis(DEFAULT_PERSIST_TIMEOUT_MS),
            http_timeout: Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS),
            marker_policy: MarkerPolicy::default(),
        }
    }
}

impl Settings {
    /// Read the settings from the process environment
    pub fn from_env() -> Result<Self, Box<dyn Error>> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the settings from any source of variables. Empty values are considered as missing
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Box<dyn Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| v.trim().is_empty() == false);
        let mut settings = Self::default();

        if let Some(raw) = get(ENV_API_URL) {
            let url = Url::parse(raw.trim()).map_err(|err| format!("Invalid {} {:?}: {}", ENV_API_URL, raw, err))?;
            settings.api_url = Some(url);
        }
        settings.api_key = get(ENV_API_KEY);
        if let Some(dir) = get(ENV_DATA_DIR) {
            settings.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = get(ENV_PERSIST_TIMEOUT_MS) {
            settings.persist_timeout = parse_millis(ENV_PERSIST_TIMEOUT_MS, &raw)?;
        }
        if let Some(raw) = get(ENV_HTTP_TIMEOUT_MS) {
            settings.http_timeout = parse_millis(ENV_HTTP_TIMEOUT_MS, &raw)?;
        }
        if let Some(raw) = get(ENV_MARKERS) {
            settings.marker_policy = raw.parse()?;
        }
        Ok(settings)
    }

    /// The API URL, or an error that tells how to configure it
    pub fn require_api_url(&self) -> Result<&Url, Box<dyn Error>> {
        self.api_url.as_ref()
            .ok_or_else(|| format!("No task API is configured. Please set {}", ENV_API_URL).into())
    }
}

/// The user agent sent to the task API
pub fn user_agent() -> String {
    let product = PRODUCT_NAME.lock().unwrap().clone();
    format!("{}/{}", product, env!("CARGO_PKG_VERSION"))
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("deadline-board"))
        .unwrap_or_else(|| PathBuf::from("deadline-board-data"))
}

fn parse_millis(name: &str, raw: &str) -> Result<Duration, Box<dyn Error>> {
    let millis: u64 = raw.trim().parse()
        .map_err(|err| format!("Invalid {} {:?}: {}", name, raw, err))?;
    if millis == 0 {
        return Err(format!("{} must not be 0", name).into());
    }
    Ok(Duration::from_millis(millis))
}
