use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::release::{DEFAULT_MAX_CONCURRENT, Error, Result};

const UPLOAD_URL_KEY: &str = "INPUT_UPLOAD_URL";
const ASSET_DIR_KEY: &str = "INPUT_ASSET_DIR";
const MAX_CONCURRENT_KEY: &str = "INPUT_MAX_CONCURRENT";
const TIMEOUT_KEY: &str = "INPUT_TIMEOUT_SECS";
const TOKEN_KEY: &str = "GITHUB_TOKEN";

/// Values given explicitly on the command line; they win over the environment
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    pub upload_url: Option<String>,
    pub asset_dir: Option<PathBuf>,
    pub token: Option<String>,
    pub max_concurrent: Option<usize>,
    pub timeout_secs: Option<u64>,
}

/// Configuration for one release asset upload run
#[derive(Debug, Clone)]
pub struct Config {
    pub upload_url: String,
    pub asset_dir: PathBuf,
    pub token: Option<String>,
    pub max_concurrent: usize,
    pub timeout: Option<Duration>,
}

impl Config {
    /// Load configuration from command line inputs, environment variables and .env file
    ///
    /// Inputs missing from the command line are read the way GitHub Actions
    /// passes them (`INPUT_UPLOAD_URL`, `INPUT_ASSET_DIR`, ...). The token is
    /// taken from `GITHUB_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if a required input is missing or invalid
    pub fn from_env(inputs: Inputs) -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if it exists

        Self::resolve(inputs, |key| env::var(key).ok())
    }

    /// Build configuration from explicit inputs, falling back to `lookup`
    pub fn resolve(inputs: Inputs, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let upload_url = inputs
            .upload_url
            .filter(|v| !v.trim().is_empty())
            .or_else(|| get(UPLOAD_URL_KEY))
            .ok_or_else(|| missing_input("upload_url"))?;
        let upload_url = upload_url.trim().to_string();
        Self::validate_upload_url(&upload_url)?;

        let asset_dir = inputs
            .asset_dir
            .filter(|p| !p.as_os_str().is_empty())
            .or_else(|| get(ASSET_DIR_KEY).map(|v| PathBuf::from(v.trim())))
            .ok_or_else(|| missing_input("asset_dir"))?;

        let token = inputs.token.or_else(|| get(TOKEN_KEY));

        let max_concurrent = match inputs.max_concurrent {
            Some(n) => n,
            None => match get(MAX_CONCURRENT_KEY) {
                Some(v) => parse_number(MAX_CONCURRENT_KEY, &v)?,
                None => DEFAULT_MAX_CONCURRENT,
            },
        };
        Self::validate_max_concurrent(max_concurrent)?;

        let timeout_secs = match inputs.timeout_secs {
            Some(n) => Some(n),
            None => get(TIMEOUT_KEY)
                .map(|v| parse_number(TIMEOUT_KEY, &v))
                .transpose()?,
        };
        let timeout = timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            upload_url,
            asset_dir,
            token,
            max_concurrent,
            timeout,
        })
    }

    /// Validate the release upload URL, ignoring any `{?name,label}` template
    fn validate_upload_url(upload_url: &str) -> Result<()> {
        let base = upload_url.split('{').next().unwrap_or_default();

        let url = reqwest::Url::parse(base).map_err(|e| {
            Error::Configuration(format!("upload_url '{}' is not a valid URL: {}", upload_url, e))
        })?;

        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(Error::Configuration(format!(
                "upload_url '{}' must use http or https",
                upload_url
            )));
        }

        Ok(())
    }

    fn validate_max_concurrent(max_concurrent: usize) -> Result<()> {
        if max_concurrent == 0 {
            return Err(Error::Configuration(
                "max_concurrent must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

fn missing_input(name: &str) -> Error {
    Error::Configuration(format!("Input required and not supplied: {}", name))
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        Error::Configuration(format!("{} must be a non-negative integer, got '{}'", key, value))
    })
}
