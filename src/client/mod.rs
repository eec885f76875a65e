//! Clients for the external backends: the scrape-as-a-service API and the
//! LLM chat-completions API.

mod llm;
mod scrape;

pub use llm::{ChatTurn, LlmClient, ToolCall};
pub use scrape::ScrapeClient;

use async_trait::async_trait;

use crate::error::Result;

/// Seam for fetching raw page markup, so the analyzer and tools can run
/// against a stub in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}
