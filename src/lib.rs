//! flipbot — resale arbitrage analysis bot
//!
//! Given a product-listing URL, fetch the page through a scraping backend,
//! reduce it to a bounded text signal, hand it to an LLM agent with a small
//! tool table, and return a markdown verdict on whether the listing is a
//! profitable flip.
//!
//! ## Architecture
//!
//! ```text
//! Telegram / REST / CLI → Analyzer → (fetch → reduce → agent → format)
//!                            ↑                          |
//!                      UsageStore (paywall)       local fallback
//!                            ↑                  (reference prices + margin)
//!                     Payment webhook (HMAC)
//! ```

pub mod agent;
pub mod analyzer;
pub mod client;
pub mod config;
pub mod error;
pub mod margin;
pub mod payment;
pub mod reduce;
pub mod report;
pub mod server;
pub mod storage;
pub mod telegram;
pub mod utils;

#[cfg(test)]
mod config_tests;
