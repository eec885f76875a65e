//! Content reduction: raw listing markup to a bounded plain-text signal
//!
//! Marketplace pages are megabytes of script/style noise around a few hundred
//! bytes of signal (title, price, feature bullets). The reducer strips
//! non-visible subtrees, pulls known high-signal regions first, falls back to
//! whole-page text, and truncates to a character budget sized for a
//! downstream model's input window.


use ego_tree::NodeRef;
use regex::Regex;
use rust_decimal::Decimal;
use scraper::{Html, Node, Selector};
use serde::Deserialize;

use crate::utils::truncate_chars;

/// Tags whose entire subtree is invisible or structural noise.
const STRIP_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "svg", "iframe", "noscript",
];

/// High-signal regions on marketplace pages, scanned in priority order.
/// A missing region is simply skipped.
const TARGET_SELECTORS: &[&str] = &[
    "#productTitle",
    "#corePrice_feature_div",
    "#priceblock_ourprice",
    "#feature-bullets",
    "#productDescription",
    ".s-search-results",
    ".srp-results",
];

/// Delimiter between concatenated target regions.
const REGION_DELIMITER: &str = " | ";

/// Reducer tuning. Call sites vary the budget between 1500 and 10000.
#[derive(Debug, Clone, Deserialize)]
pub struct ReducerConfig {
    /// Maximum output length in characters.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    /// Below this many characters, targeted extraction is considered a miss
    /// and the whole document is used instead.
    #[serde(default = "default_min_signal_chars")]
    pub min_signal_chars: usize,
}

fn default_max_chars() -> usize {
    8000
}

fn default_min_signal_chars() -> usize {
    40
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            min_signal_chars: default_min_signal_chars(),
        }
    }
}

/// What the reducer extracted from one fetched page. Immutable, not persisted.
#[derive(Debug, Clone)]
pub struct ListingSnapshot {
    pub source_url: String,
    /// Reduced visible text, length <= the configured budget.
    pub text: String,
    pub extracted_price: Option<Decimal>,
    pub extracted_title: Option<String>,
}

/// Reduce raw markup to bounded plain text.
///
/// Never panics: malformed markup degrades to best-effort extraction and
/// empty input yields an empty string.
pub fn reduce(html: &str, cfg: &ReducerConfig) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let doc = Html::parse_document(html);

    // Targeted pass over known high-signal regions.
    let mut regions: Vec<String> = Vec::new();
    for sel in TARGET_SELECTORS {
        let selector = match Selector::parse(sel) {
            Ok(s) => s,
            Err(_) => continue,
        };
        for element in doc.select(&selector) {
            let mut buf = String::new();
            collect_visible_text(*element, &mut buf);
            let text = collapse_whitespace(&buf);
            if !text.is_empty() {
                regions.push(text);
            }
        }
    }

    let mut text = regions.join(REGION_DELIMITER);

    // Fallback: whole-document visible text.
    if text.len() < cfg.min_signal_chars {
        let mut buf = String::new();
        collect_visible_text(doc.tree.root(), &mut buf);
        text = collapse_whitespace(&buf);
    }

    truncate_chars(&text, cfg.max_chars).to_string()
}

/// Build a [`ListingSnapshot`] from fetched markup.
pub fn snapshot(url: &str, html: &str, cfg: &ReducerConfig) -> ListingSnapshot {
    let text = reduce(html, cfg);
    ListingSnapshot {
        source_url: url.to_string(),
        extracted_price: extract_price(&text),
        extracted_title: extract_title(html),
        text,
    }
}

/// First `$`-amount in the text, if any.
pub fn extract_price(text: &str) -> Option<Decimal> {
    let re = Regex::new(r"\$\s*([\d,]+(?:\.\d+)?)").expect("static regex");
    let captures = re.captures(text)?;
    captures.get(1)?.as_str().replace(',', "").parse().ok()
}

/// Listing title: product-title region, then `<title>`, then the first h1.
fn extract_title(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    for sel in ["#productTitle", "title", "h1"] {
        let selector = match Selector::parse(sel) {
            Ok(s) => s,
            Err(_) => continue,
        };
        if let Some(element) = doc.select(&selector).next() {
            let mut buf = String::new();
            collect_visible_text(*element, &mut buf);
            let text = collapse_whitespace(&buf);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// Depth-first visible-text walk that drops [`STRIP_TAGS`] subtrees entirely.
///
/// Iterative on purpose: adversarially nested markup must not blow the stack.
fn collect_visible_text(root: NodeRef<'_, Node>, out: &mut String) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        match node.value() {
            Node::Text(t) => {
                out.push_str(t);
                out.push(' ');
            }
            Node::Element(el) if STRIP_TAGS.contains(&el.name()) => continue,
            _ => {}
        }
        let children: Vec<_> = node.children().collect();
        for child in children.into_iter().rev() {
            stack.push(child);
        }
    }
}

/// Collapse all whitespace runs (including newlines) to single spaces.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
