//! Listing analysis: fetch -> reduce -> infer -> format
//!
//! The single core entry point. The LLM agent produces the report when it is
//! configured and reachable; otherwise a deterministic local fallback
//! (keyword category guess plus a static reference-price table) still gives
//! the user an answer.


use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::agent::AgentRunner;
use crate::client::PageFetcher;
use crate::error::Result;
use crate::margin::{self, FeePolicy};
use crate::reduce::{self, ListingSnapshot, ReducerConfig};
use crate::report::{self, Report, Verdict};

/// Typical resale market values by category, the local stand-in for live
/// price comparison when the inference backend is unreachable.
pub const REFERENCE_PRICES: &[(&str, Decimal)] = &[
    ("laptop", dec!(1000)),
    ("headphones", dec!(150)),
    ("phone", dec!(700)),
    ("monitor", dec!(300)),
    ("keyboard", dec!(100)),
    ("mouse", dec!(50)),
    ("desk", dec!(400)),
];

/// Below this fraction of reference value, a listing is an underpriced alert.
const UNDERPRICED_THRESHOLD: Decimal = dec!(0.80);
/// Below this fraction (but above the alert line), a listing is a good deal.
const GOOD_DEAL_THRESHOLD: Decimal = dec!(0.90);
/// Up to this fraction, a listing is fairly priced.
const FAIR_THRESHOLD: Decimal = dec!(1.10);

/// Reference market value for a category, if the table knows it.
pub fn reference_price(category: &str) -> Option<Decimal> {
    let lower = category.to_lowercase();
    REFERENCE_PRICES
        .iter()
        .find(|(name, _)| lower.contains(name))
        .map(|(_, value)| *value)
}

/// Keyword guess of the product category from free text.
pub fn guess_category(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    REFERENCE_PRICES
        .iter()
        .map(|(name, _)| *name)
        .find(|name| lower.contains(name))
}

pub struct Analyzer {
    fetcher: Arc<dyn PageFetcher>,
    reducer: ReducerConfig,
    agent: Option<AgentRunner>,
    fees: FeePolicy,
}

impl Analyzer {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        reducer: ReducerConfig,
        agent: Option<AgentRunner>,
        fees: FeePolicy,
    ) -> Self {
        Self {
            fetcher,
            reducer,
            agent,
            fees,
        }
    }

    /// Analyze one listing URL and return a markdown report.
    ///
    /// Externally-triggered failures degrade to report text: a fetch error
    /// becomes an error report, an unreachable inference backend falls back
    /// to the local comparison. The returned report is never empty.
    pub async fn analyze(&self, url: &str) -> Result<Report> {
        let html = match self.fetcher.fetch(url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Fetch failed for {}: {}", url, e);
                return Ok(report::fetch_failure(url, &e.to_string()));
            }
        };

        let snapshot = reduce::snapshot(url, &html, &self.reducer);
        tracing::info!(
            url,
            chars = snapshot.text.len(),
            price = ?snapshot.extracted_price,
            "listing reduced"
        );

        if let Some(agent) = &self.agent {
            match agent.run(&agent_prompt(&snapshot)).await {
                Ok(answer) => {
                    return Ok(Report {
                        url: url.to_string(),
                        markdown: answer,
                    })
                }
                Err(e) => {
                    tracing::warn!("Agent unavailable, using local fallback: {}", e);
                }
            }
        }

        Ok(self.fallback_report(&snapshot))
    }

    /// Deterministic local analysis: category guess, reference price, fee
    /// math, threshold verdict.
    fn fallback_report(&self, snapshot: &ListingSnapshot) -> Report {
        let haystack = format!(
            "{} {}",
            snapshot.extracted_title.as_deref().unwrap_or(""),
            snapshot.text
        );
        let category = guess_category(&haystack);
        let reference = category.and_then(reference_price);

        let (Some(category), Some(reference)) = (category, reference) else {
            return report::unknown_category(snapshot);
        };

        let Some(listed) = snapshot.extracted_price else {
            return report::missing_price(snapshot, category, reference);
        };

        // Flip framing: buy at the listed price, resell at reference value.
        let margin = match margin::compute(reference, listed, Some(category), &self.fees) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("Margin computation rejected listing input: {}", e);
                return report::missing_price(snapshot, category, reference);
            }
        };

        let (verdict, band) = if reference.is_zero() {
            (Verdict::Avoid, "UNKNOWN")
        } else {
            let ratio = listed / reference;
            if ratio <= UNDERPRICED_THRESHOLD {
                (Verdict::Buy, "UNDERPRICED")
            } else if ratio <= GOOD_DEAL_THRESHOLD {
                (Verdict::Consider, "GOOD DEAL")
            } else if ratio <= FAIR_THRESHOLD {
                (Verdict::Avoid, "FAIRLY PRICED")
            } else {
                (Verdict::Avoid, "OVERPRICED")
            }
        };

        report::fallback(snapshot, category, reference, &margin, verdict, band)
    }
}

fn agent_prompt(snapshot: &ListingSnapshot) -> String {
    format!(
        "Please analyze this product listing for pricing:\nURL: {}\n\n\
        Already-extracted page signal:\nTitle: {}\nPrice: {}\nContent: {}\n\n\
        Steps:\n\
        1. Identify the product category from the listing content\n\
        2. Compare the listed price against typical market value\n\
        3. Use margin_calculator to get the fee-adjusted net profit of a flip\n\
        4. If the item is significantly underpriced (20%+ below market value), \
        generate an ALERT with details",
        snapshot.source_url,
        snapshot.extracted_title.as_deref().unwrap_or("N/A"),
        snapshot
            .extracted_price
            .map(|p| format!("${p}"))
            .unwrap_or_else(|| "N/A".to_string()),
        snapshot.text
    )
}
