//! Configuration loading
//!
//! TOML file plus `FLIPBOT_`-prefixed environment overrides. Every section
//! except `[scrape]` is optional; optional surfaces (Telegram, payments,
//! social webhook, LLM) simply stay disabled when their section is absent.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::error::Result;
use crate::margin::{FeePolicy, DEFAULT_FULFILLMENT_FEE, FLAT_MARKETPLACE_RATE};
use crate::reduce::ReducerConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub scrape: ScrapeConfig,
    pub llm: Option<LlmConfig>,
    pub telegram: Option<TelegramConfig>,
    pub payment: Option<PaymentConfig>,
    pub social: Option<SocialConfig>,
    #[serde(default)]
    pub fees: FeesConfig,
    #[serde(default)]
    pub reducer: ReducerConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub storage: Option<StorageConfig>,
}

impl Config {
    /// Load from a TOML file with environment overrides
    /// (e.g. `FLIPBOT_SCRAPE__API_KEY`).
    pub fn load(path: &str) -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = shellexpand::tilde(path).to_string();
        let config = config::Config::builder()
            .add_source(config::File::with_name(&path))
            .add_source(config::Environment::with_prefix("FLIPBOT").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

/// Scrape-as-a-service backend.
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeConfig {
    #[serde(default = "default_scrape_base_url")]
    pub base_url: String,
    pub api_key: String,
    #[serde(default = "default_country_code")]
    pub country_code: String,
    #[serde(default)]
    pub premium: bool,
    #[serde(default = "default_scrape_timeout")]
    pub timeout_secs: u64,
}

fn default_scrape_base_url() -> String {
    "https://api.scraperapi.com".to_string()
}

fn default_country_code() -> String {
    "us".to_string()
}

fn default_scrape_timeout() -> u64 {
    60
}

/// LLM inference backend.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub provider: String,
    #[serde(default)]
    pub api_key: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,
}

fn default_max_steps() -> u32 {
    6
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// Chat to receive operational notifications, if any.
    pub admin_chat_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    pub api_key: String,
    pub webhook_secret: String,
    #[serde(default = "default_payment_base_url")]
    pub base_url: String,
    #[serde(default = "default_checkout_price")]
    pub checkout_price_usd: Decimal,
}

fn default_payment_base_url() -> String {
    "https://api.commerce.coinbase.com".to_string()
}

fn default_checkout_price() -> Decimal {
    dec!(9.99)
}

/// Social-media webhook verification handshake.
#[derive(Debug, Clone, Deserialize)]
pub struct SocialConfig {
    pub webhook_secret: String,
}

/// Marketplace fee schedule selection.
#[derive(Debug, Clone, Deserialize)]
pub struct FeesConfig {
    /// "categorized" or "flat"
    #[serde(default = "default_fee_policy")]
    pub policy: String,
    #[serde(default = "default_fulfillment_fee")]
    pub fulfillment_fee: Decimal,
    #[serde(default = "default_flat_rate")]
    pub flat_rate: Decimal,
}

fn default_fee_policy() -> String {
    "categorized".to_string()
}

fn default_fulfillment_fee() -> Decimal {
    DEFAULT_FULFILLMENT_FEE
}

fn default_flat_rate() -> Decimal {
    FLAT_MARKETPLACE_RATE
}

impl Default for FeesConfig {
    fn default() -> Self {
        Self {
            policy: default_fee_policy(),
            fulfillment_fee: default_fulfillment_fee(),
            flat_rate: default_flat_rate(),
        }
    }
}

impl FeesConfig {
    pub fn policy(&self) -> FeePolicy {
        match self.policy.to_lowercase().as_str() {
            "flat" => FeePolicy::Flat {
                rate: self.flat_rate,
            },
            _ => FeePolicy::Categorized {
                fulfillment_fee: self.fulfillment_fee,
            },
        }
    }
}

/// Paywall and concurrency limits.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_free_scans")]
    pub free_scans: u32,
    #[serde(default = "default_max_concurrent_scans")]
    pub max_concurrent_scans: usize,
}

fn default_free_scans() -> u32 {
    3
}

fn default_max_concurrent_scans() -> usize {
    4
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            free_scans: default_free_scans(),
            max_concurrent_scans: default_max_concurrent_scans(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Durable usage store; absent means in-memory.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub path: String,
}
