use crate::error::ConfigError;
use std::env;
use std::path::PathBuf;

pub const TESTNET_BASE_URL: &str = "https://testnet.binancefuture.com";
pub const MAINNET_BASE_URL: &str = "https://fapi.binance.com";
const DEFAULT_RECV_WINDOW: u64 = 5000;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
    pub testnet: bool,
    pub recv_window: u64,
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("BINANCE_API_KEY").ok_or(ConfigError::Missing("BINANCE_API_KEY"))?;
        let api_secret =
            get("BINANCE_API_SECRET").ok_or(ConfigError::Missing("BINANCE_API_SECRET"))?;

        let testnet = match get("BINANCE_TESTNET") {
            Some(raw) => parse_bool("BINANCE_TESTNET", &raw)?,
            None => true,
        };

        let base_url = match get("BINANCE_BASE_URL") {
            Some(raw) => {
                reqwest::Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
                    key: "BINANCE_BASE_URL",
                    value: raw.clone(),
                    reason: e.to_string(),
                })?;
                raw.trim().trim_end_matches('/').to_string()
            }
            None if testnet => TESTNET_BASE_URL.to_string(),
            None => MAINNET_BASE_URL.to_string(),
        };

        let recv_window = match get("BINANCE_RECV_WINDOW") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                key: "BINANCE_RECV_WINDOW",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_RECV_WINDOW,
        };

        Ok(Self {
            api_key: api_key.trim().to_string(),
            api_secret: api_secret.trim().to_string(),
            base_url,
            testnet,
            recv_window,
            log_file: get("BOT_LOG_FILE").map(PathBuf::from),
        })
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
