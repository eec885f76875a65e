//! Scrape-as-a-service client
//!
//! Plain HTTP GET against the proxy-scraping API with the target URL and
//! locale/quality parameters. One fixed timeout per call, no retry; a 403
//! from the backend means the account is out of credits.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::PageFetcher;
use crate::config::ScrapeConfig;
use crate::error::{FlipError, Result};

pub struct ScrapeClient {
    http: Client,
    base_url: String,
    api_key: String,
    country_code: String,
    premium: bool,
}

impl ScrapeClient {
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            country_code: config.country_code.clone(),
            premium: config.premium,
        })
    }
}

#[async_trait]
impl PageFetcher for ScrapeClient {
    async fn fetch(&self, url: &str) -> Result<String> {
        tracing::debug!("Scraping {}", url);

        let resp = self
            .http
            .get(&self.base_url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("url", url),
                ("country_code", self.country_code.as_str()),
                ("premium", if self.premium { "true" } else { "false" }),
            ])
            .send()
            .await?;

        match resp.status() {
            StatusCode::FORBIDDEN => Err(FlipError::CreditsExhausted),
            status if !status.is_success() => Err(FlipError::Api(format!(
                "scrape backend returned {status} for {url}"
            ))),
            _ => Ok(resp.text().await?),
        }
    }
}
