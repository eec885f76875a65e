//! Payment processor integration: hosted checkout charges and the signed
//! confirmation webhook.

mod signature;

#[cfg(test)]
mod tests;

pub use signature::{crc_response_token, verify_signature};

use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::config::PaymentConfig;
use crate::error::{FlipError, Result};

/// The only webhook event type that grants an entitlement.
pub const CONFIRMED_EVENT: &str = "charge:confirmed";

/// A created hosted-checkout charge.
#[derive(Debug, Clone, Deserialize)]
pub struct Charge {
    pub code: String,
    pub hosted_url: String,
}

/// Parsed confirmation webhook payload.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEnvelope {
    pub event: WebhookEvent,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: Value,
}

impl WebhookEvent {
    /// The opaque user id carried in the charge metadata, if present.
    pub fn user_id(&self) -> Option<&str> {
        self.data["metadata"]["user_id"].as_str()
    }

    pub fn is_confirmed(&self) -> bool {
        self.event_type == CONFIRMED_EVENT
    }
}

pub struct PaymentClient {
    http: Client,
    base_url: String,
    api_key: String,
    checkout_price_usd: Decimal,
}

impl PaymentClient {
    pub fn new(config: &PaymentConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            checkout_price_usd: config.checkout_price_usd,
        })
    }

    /// Create a fixed-price hosted checkout for one user. The user id rides
    /// in the charge metadata and comes back on the confirmation webhook.
    pub async fn create_charge(&self, user_id: &str) -> Result<Charge> {
        let reference = Uuid::new_v4();
        let request = serde_json::json!({
            "name": "flipbot pro",
            "description": "Unlimited listing scans",
            "pricing_type": "fixed_price",
            "local_price": {
                "amount": self.checkout_price_usd.to_string(),
                "currency": "USD",
            },
            "metadata": {
                "user_id": user_id,
                "reference": reference,
            },
        });

        let resp = self
            .http
            .post(format!("{}/charges", self.base_url))
            .header("X-CC-Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FlipError::Api(format!(
                "payment processor returned {status} creating charge"
            )));
        }

        let body: Value = resp.json().await?;
        let charge: Charge = serde_json::from_value(body["data"].clone())
            .map_err(|e| FlipError::Api(format!("malformed charge response: {e}")))?;

        tracing::info!(user_id, code = %charge.code, "checkout charge created");
        Ok(charge)
    }
}

/// Verify and parse a confirmation webhook body.
///
/// Signature mismatch is a hard reject: no parsing, no state mutation.
pub fn parse_webhook(secret: &str, body: &[u8], signature_hex: &str) -> Result<WebhookEnvelope> {
    if !verify_signature(secret, body, signature_hex) {
        return Err(FlipError::SignatureInvalid);
    }
    Ok(serde_json::from_slice(body)?)
}
