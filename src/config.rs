use serde::Deserialize;
use std::env;

use crate::constants::{
    DEFAULT_TAP_BUDGET, DEV_SEED_EARN_PER_TAP, DEV_SEED_USER_ID, HTTP_TIMEOUT_SECS,
    PLUS_ONE_LIFETIME_MS, SAVE_DEBOUNCE_MS, SUBMIT_DELAY_MS,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Dev server
    pub host: String,
    pub port: u16,
    pub environment: String,

    // Client -> backend
    pub api_base_url: String,
    pub http_timeout_secs: u64,

    // Timing
    pub save_debounce_ms: u64,
    pub plus_one_lifetime_ms: u64,
    pub submit_delay_ms: u64,

    // Play screen
    pub default_tap_budget: u32,

    // Wallet
    pub wallet_provider: String,
    pub wallet_address: Option<String>,

    // Platform
    pub clipboard_command: Option<String>,
    pub telegram_webapp: bool,

    // CORS
    pub cors_allowed_origins: String,

    // Dev backend seed
    pub dev_seed_user_id: String,
    pub dev_seed_earn_per_tap: f64,
}

// Internal helper that reads boolean-ish env flags.
fn is_env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .map(|value| {
            let normalized = value.trim().to_ascii_lowercase();
            normalized == "1" || normalized == "true" || normalized == "yes" || normalized == "on"
        })
        .unwrap_or(false)
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:3000".to_string()),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| HTTP_TIMEOUT_SECS.to_string())
                .parse()?,

            save_debounce_ms: env::var("SAVE_DEBOUNCE_MS")
                .unwrap_or_else(|_| SAVE_DEBOUNCE_MS.to_string())
                .parse()?,
            plus_one_lifetime_ms: env::var("PLUS_ONE_LIFETIME_MS")
                .unwrap_or_else(|_| PLUS_ONE_LIFETIME_MS.to_string())
                .parse()?,
            submit_delay_ms: env::var("SUBMIT_DELAY_MS")
                .unwrap_or_else(|_| SUBMIT_DELAY_MS.to_string())
                .parse()?,

            default_tap_budget: env::var("DEFAULT_TAP_BUDGET")
                .unwrap_or_else(|_| DEFAULT_TAP_BUDGET.to_string())
                .parse()?,

            wallet_provider: env::var("WALLET_PROVIDER").unwrap_or_else(|_| "none".to_string()),
            wallet_address: env::var("WALLET_ADDRESS").ok().filter(|s| !s.trim().is_empty()),

            clipboard_command: env::var("CLIPBOARD_COMMAND")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            telegram_webapp: is_env_flag_enabled("TELEGRAM_WEBAPP"),

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),

            dev_seed_user_id: env::var("DEV_SEED_USER_ID")
                .unwrap_or_else(|_| DEV_SEED_USER_ID.to_string()),
            dev_seed_earn_per_tap: env::var("DEV_SEED_EARN_PER_TAP")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEV_SEED_EARN_PER_TAP),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_base_url.trim().is_empty() {
            anyhow::bail!("API_BASE_URL is empty");
        }
        if url::Url::parse(&self.api_base_url).is_err() {
            anyhow::bail!("API_BASE_URL is not a valid URL: {}", self.api_base_url);
        }
        if self.save_debounce_ms == 0 {
            anyhow::bail!("SAVE_DEBOUNCE_MS must be > 0");
        }
        if !self.dev_seed_earn_per_tap.is_finite() || self.dev_seed_earn_per_tap <= 0.0 {
            anyhow::bail!("DEV_SEED_EARN_PER_TAP must be a positive number");
        }

        if crate::integrations::wallet::WalletProvider::parse(&self.wallet_provider).is_none() {
            tracing::warn!(
                "Unknown WALLET_PROVIDER '{}'; wallet features disabled",
                self.wallet_provider
            );
        }
        if self.default_tap_budget == 0 {
            tracing::warn!("DEFAULT_TAP_BUDGET is 0; taps will be ignored until a budget is set");
        }
        if self.http_timeout_secs == 0 {
            tracing::warn!("HTTP_TIMEOUT_SECS is 0; requests will time out immediately");
        }
        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; requests may be blocked");
        }

        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development" || self.environment == "dev"
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            api_base_url: "http://127.0.0.1:3000".to_string(),
            http_timeout_secs: 5,
            save_debounce_ms: SAVE_DEBOUNCE_MS,
            plus_one_lifetime_ms: PLUS_ONE_LIFETIME_MS,
            submit_delay_ms: SUBMIT_DELAY_MS,
            default_tap_budget: DEFAULT_TAP_BUDGET,
            wallet_provider: "none".to_string(),
            wallet_address: None,
            clipboard_command: None,
            telegram_webapp: false,
            cors_allowed_origins: "*".to_string(),
            dev_seed_user_id: DEV_SEED_USER_ID.to_string(),
            dev_seed_earn_per_tap: DEV_SEED_EARN_PER_TAP,
        }
    }
}
