//! Fee and margin arithmetic for flip evaluation
//!
//! Pure functions over [`Decimal`]; no I/O. Two fee policies exist and are
//! never merged: the category-based referral schedule with a flat fulfillment
//! add-on, and a single flat marketplace rate.


use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::{FlipError, Result};

/// Referral rate for categories matching an electronics keyword.
pub const ELECTRONICS_REFERRAL_RATE: Decimal = dec!(0.08);
/// Referral rate for categories matching an apparel keyword.
pub const APPAREL_REFERRAL_RATE: Decimal = dec!(0.17);
/// Default referral rate for everything else.
pub const GENERAL_REFERRAL_RATE: Decimal = dec!(0.15);
/// Marketplace rate used by the flat policy (no fulfillment add-on).
pub const FLAT_MARKETPLACE_RATE: Decimal = dec!(0.13);
/// Per-order fulfillment fee. Observed values ranged 3.22-5.25 across
/// iterations; 5.25 is the authoritative choice (see DESIGN.md).
pub const DEFAULT_FULFILLMENT_FEE: Decimal = dec!(5.25);

const ELECTRONICS_KEYWORDS: &[&str] = &[
    "electronic", "laptop", "computer", "phone", "tablet", "camera", "headphone", "monitor",
    "console", "keyboard", "mouse", "tv",
];

const APPAREL_KEYWORDS: &[&str] = &[
    "apparel", "clothing", "shirt", "shoe", "sneaker", "jacket", "dress", "pants",
];

/// How marketplace fees are assessed.
#[derive(Debug, Clone, PartialEq)]
pub enum FeePolicy {
    /// Category-dependent referral rate plus a flat fulfillment fee.
    Categorized { fulfillment_fee: Decimal },
    /// Single marketplace rate, no fulfillment add-on.
    Flat { rate: Decimal },
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self::Categorized {
            fulfillment_fee: DEFAULT_FULFILLMENT_FEE,
        }
    }
}

/// Result of one margin computation. Fields keep full precision; rounding to
/// two decimals happens only at display time.
#[derive(Debug, Clone, PartialEq)]
pub struct MarginResult {
    pub sale_price: Decimal,
    pub cost_of_goods: Decimal,
    pub category: String,
    pub referral_fee: Decimal,
    pub fulfillment_fee: Decimal,
    pub net_profit: Decimal,
    pub roi_percent: Decimal,
}

impl MarginResult {
    /// Display form: monetary fields rounded to 2 decimal places.
    pub fn rounded(&self) -> MarginResult {
        MarginResult {
            sale_price: self.sale_price.round_dp(2),
            cost_of_goods: self.cost_of_goods.round_dp(2),
            category: self.category.clone(),
            referral_fee: self.referral_fee.round_dp(2),
            fulfillment_fee: self.fulfillment_fee.round_dp(2),
            net_profit: self.net_profit.round_dp(2),
            roi_percent: self.roi_percent.round_dp(2),
        }
    }
}

/// Resolve a referral rate from a free-text category.
///
/// Case-insensitive substring match, electronics before apparel before the
/// general default.
pub fn referral_rate(category: &str) -> Decimal {
    let lower = category.to_lowercase();
    if ELECTRONICS_KEYWORDS.iter().any(|k| lower.contains(k)) {
        ELECTRONICS_REFERRAL_RATE
    } else if APPAREL_KEYWORDS.iter().any(|k| lower.contains(k)) {
        APPAREL_REFERRAL_RATE
    } else {
        GENERAL_REFERRAL_RATE
    }
}

/// Compute net profit and ROI for a flip.
///
/// `category` defaults to "general". Negative prices are rejected;
/// `cost_of_goods == 0` is allowed and yields `roi_percent = 0`.
pub fn compute(
    sale_price: Decimal,
    cost_of_goods: Decimal,
    category: Option<&str>,
    policy: &FeePolicy,
) -> Result<MarginResult> {
    if sale_price < Decimal::ZERO {
        return Err(FlipError::InvalidInput(format!(
            "sale_price must be non-negative, got {sale_price}"
        )));
    }
    if cost_of_goods < Decimal::ZERO {
        return Err(FlipError::InvalidInput(format!(
            "cost_of_goods must be non-negative, got {cost_of_goods}"
        )));
    }

    let category = match category {
        Some(c) if !c.trim().is_empty() => c.trim().to_lowercase(),
        _ => "general".to_string(),
    };

    let (referral_fee, fulfillment_fee) = match policy {
        FeePolicy::Categorized { fulfillment_fee } => {
            (sale_price * referral_rate(&category), *fulfillment_fee)
        }
        FeePolicy::Flat { rate } => (sale_price * rate, Decimal::ZERO),
    };

    let net_profit = sale_price - cost_of_goods - referral_fee - fulfillment_fee;
    let roi_percent = if cost_of_goods > Decimal::ZERO {
        dec!(100) * net_profit / cost_of_goods
    } else {
        Decimal::ZERO
    };

    Ok(MarginResult {
        sale_price,
        cost_of_goods,
        category,
        referral_fee,
        fulfillment_fee,
        net_profit,
        roi_percent,
    })
}
