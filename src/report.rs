//! Markdown report rendering

use rust_decimal::Decimal;

use crate::margin::MarginResult;
use crate::reduce::ListingSnapshot;

/// Recommendation for a scanned listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Buy,
    Consider,
    Avoid,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Buy => "BUY",
            Verdict::Consider => "CONSIDER",
            Verdict::Avoid => "AVOID",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Verdict::Buy => "🟢",
            Verdict::Consider => "🟡",
            Verdict::Avoid => "🔴",
        }
    }
}

/// A finished analysis, ready to hand to any delivery surface.
#[derive(Debug, Clone)]
pub struct Report {
    pub url: String,
    pub markdown: String,
}

/// Report for the local fallback path, built entirely from the static
/// reference table and the fee calculator.
pub fn fallback(
    snapshot: &ListingSnapshot,
    category: &str,
    reference: Decimal,
    margin: &MarginResult,
    verdict: Verdict,
    band: &str,
) -> Report {
    let margin = margin.rounded();
    let title = snapshot.extracted_title.as_deref().unwrap_or("Listing");
    let listed = snapshot
        .extracted_price
        .map(|p| format!("${p}"))
        .unwrap_or_else(|| "unknown".to_string());

    let mut md = format!(
        "*{title}*\n\n\
        Category: {category}\n\
        Listed price: {listed}\n\
        Reference market value: ${reference}\n\
        Pricing: {band}\n\n\
        *Flip margin* (buy at listed, resell at reference)\n\
        Referral fee: ${}\n\
        Fulfillment fee: ${}\n\
        Net profit: ${}\n\
        ROI: {}%\n\n\
        {} *{}*",
        margin.referral_fee,
        margin.fulfillment_fee,
        margin.net_profit,
        margin.roi_percent,
        verdict.emoji(),
        verdict.as_str(),
    );

    if verdict == Verdict::Buy {
        md.push_str("\n\n🚨 ALERT: listing is significantly below market value");
    }

    Report {
        url: snapshot.source_url.clone(),
        markdown: md,
    }
}

/// Report when the page could not be fetched at all.
pub fn fetch_failure(url: &str, reason: &str) -> Report {
    Report {
        url: url.to_string(),
        markdown: format!("⚠️ Could not fetch listing:\n{reason}"),
    }
}

/// Report when no known category matched the listing content.
pub fn unknown_category(snapshot: &ListingSnapshot) -> Report {
    let title = snapshot.extracted_title.as_deref().unwrap_or("Listing");
    Report {
        url: snapshot.source_url.clone(),
        markdown: format!(
            "*{title}*\n\nNo reference market value is known for this product \
            category, so no flip verdict can be given offline."
        ),
    }
}

/// Report when the category is known but no price could be extracted.
pub fn missing_price(snapshot: &ListingSnapshot, category: &str, reference: Decimal) -> Report {
    let title = snapshot.extracted_title.as_deref().unwrap_or("Listing");
    Report {
        url: snapshot.source_url.clone(),
        markdown: format!(
            "*{title}*\n\n\
            Category: {category}\n\
            Reference market value: ${reference}\n\n\
            No listed price could be extracted from the page, so the margin \
            could not be computed."
        ),
    }
}
