//! Tools exposed to the agent: listing scrape, margin arithmetic, and the
//! reference-price table.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;

use super::Tool;
use crate::analyzer::{guess_category, reference_price};
use crate::client::PageFetcher;
use crate::error::{FlipError, Result};
use crate::margin::{self, FeePolicy};
use crate::reduce::{self, ReducerConfig};

/// Fetches a listing URL and returns its reduced content.
pub struct ScrapeListingTool {
    fetcher: Arc<dyn PageFetcher>,
    reducer: ReducerConfig,
}

impl ScrapeListingTool {
    pub fn new(fetcher: Arc<dyn PageFetcher>, reducer: ReducerConfig) -> Self {
        Self { fetcher, reducer }
    }
}

#[async_trait]
impl Tool for ScrapeListingTool {
    fn name(&self) -> &str {
        "scrape_listing"
    }

    fn description(&self) -> &str {
        "Fetch a product listing URL and return its title, price, and visible page content."
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {"type": "string", "description": "The URL of the product listing"}
            },
            "required": ["url"]
        })
    }

    async fn invoke(&self, args: Value) -> Result<String> {
        let url = args["url"]
            .as_str()
            .ok_or_else(|| FlipError::InvalidInput("scrape_listing requires a url".into()))?;

        let html = self.fetcher.fetch(url).await?;
        let snapshot = reduce::snapshot(url, &html, &self.reducer);

        Ok(format!(
            "Title: {}\nPrice: {}\nContent: {}",
            snapshot.extracted_title.as_deref().unwrap_or("N/A"),
            snapshot
                .extracted_price
                .map(|p| format!("${p}"))
                .unwrap_or_else(|| "N/A".to_string()),
            snapshot.text
        ))
    }
}

/// Deterministic fee/margin arithmetic.
pub struct MarginTool {
    policy: FeePolicy,
}

impl MarginTool {
    pub fn new(policy: FeePolicy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl Tool for MarginTool {
    fn name(&self) -> &str {
        "margin_calculator"
    }

    fn description(&self) -> &str {
        "Compute net profit and ROI for reselling an item, after marketplace referral and fulfillment fees."
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "sale_price": {"type": "number", "description": "Expected resale price in USD"},
                "cost_of_goods": {"type": "number", "description": "Purchase price in USD"},
                "category": {"type": "string", "description": "Product category, e.g. electronics"}
            },
            "required": ["sale_price", "cost_of_goods"]
        })
    }

    async fn invoke(&self, args: Value) -> Result<String> {
        let sale_price = decimal_arg(&args, "sale_price")?;
        let cost_of_goods = decimal_arg(&args, "cost_of_goods")?;
        let category = args["category"].as_str();

        let result = margin::compute(sale_price, cost_of_goods, category, &self.policy)?.rounded();
        Ok(format!(
            "Category: {}\nReferral fee: ${}\nFulfillment fee: ${}\nNet profit: ${}\nROI: {}%",
            result.category,
            result.referral_fee,
            result.fulfillment_fee,
            result.net_profit,
            result.roi_percent
        ))
    }
}

/// Static market-value lookup used when live comparisons are unavailable.
pub struct MarketValueTool;

#[async_trait]
impl Tool for MarketValueTool {
    fn name(&self) -> &str {
        "market_value"
    }

    fn description(&self) -> &str {
        "Look up the typical resale market value for a product category."
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "category": {"type": "string", "description": "Product category, e.g. laptop"}
            },
            "required": ["category"]
        })
    }

    async fn invoke(&self, args: Value) -> Result<String> {
        let raw = args["category"]
            .as_str()
            .ok_or_else(|| FlipError::InvalidInput("market_value requires a category".into()))?;

        let category = guess_category(raw).unwrap_or(raw);
        match reference_price(category) {
            Some(value) => Ok(format!("Typical market value for {category}: ${value}")),
            None => Ok(format!("No reference market value known for {raw}")),
        }
    }
}

fn decimal_arg(args: &Value, key: &str) -> Result<Decimal> {
    let number = args[key]
        .as_f64()
        .ok_or_else(|| FlipError::InvalidInput(format!("missing numeric argument: {key}")))?;
    Decimal::try_from(number)
        .map_err(|_| FlipError::InvalidInput(format!("{key} is not a valid amount: {number}")))
}
