//! Tests for the tool registry and tool implementations

#[cfg(test)]
mod tests {
    use super::super::tools::{MarginTool, MarketValueTool, ScrapeListingTool};
    use super::super::{Tool, ToolRegistry};
    use crate::client::MockPageFetcher;
    use crate::margin::FeePolicy;
    use crate::reduce::ReducerConfig;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use serde_json::{json, Value};
    use std::sync::Arc;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echoes its input back."
        }

        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {"msg": {"type": "string"}}})
        }

        async fn invoke(&self, args: Value) -> crate::error::Result<String> {
            Ok(args["msg"].as_str().unwrap_or("").to_string())
        }
    }

    #[tokio::test]
    async fn test_registry_dispatches_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));

        let out = registry
            .dispatch("echo", json!({"msg": "hello"}))
            .await
            .unwrap();
        assert_eq!(out, "hello");
    }

    #[tokio::test]
    async fn test_registry_rejects_unknown_tool() {
        let registry = ToolRegistry::new();
        let err = registry.dispatch("nope", json!({})).await.unwrap_err();
        assert!(err.to_string().contains("unknown tool"));
    }

    #[test]
    fn test_specs_use_function_wire_shape() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));

        let specs = registry.specs();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0]["type"], "function");
        assert_eq!(specs[0]["function"]["name"], "echo");
        assert!(specs[0]["function"]["parameters"].is_object());
    }

    #[test]
    fn test_empty_registry() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.specs().is_empty());
    }

    #[tokio::test]
    async fn test_margin_tool_formats_breakdown() {
        let tool = MarginTool::new(FeePolicy::Categorized {
            fulfillment_fee: dec!(5.25),
        });
        let out = tool
            .invoke(json!({
                "sale_price": 100.0,
                "cost_of_goods": 50.0,
                "category": "electronics"
            }))
            .await
            .unwrap();

        assert!(out.contains("Net profit: $36.75"));
        assert!(out.contains("ROI: 73.5"));
    }

    #[tokio::test]
    async fn test_margin_tool_rejects_missing_arguments() {
        let tool = MarginTool::new(FeePolicy::default());
        let err = tool.invoke(json!({"sale_price": 10.0})).await.unwrap_err();
        assert!(err.to_string().contains("cost_of_goods"));
    }

    #[tokio::test]
    async fn test_market_value_tool_known_category() {
        let out = MarketValueTool
            .invoke(json!({"category": "laptop"}))
            .await
            .unwrap();
        assert!(out.contains("$1000"));
    }

    #[tokio::test]
    async fn test_market_value_tool_unknown_category() {
        let out = MarketValueTool
            .invoke(json!({"category": "submarine"}))
            .await
            .unwrap();
        assert!(out.contains("No reference market value"));
    }

    #[tokio::test]
    async fn test_scrape_tool_reduces_fetched_page() {
        let mut fetcher = MockPageFetcher::new();
        fetcher.expect_fetch().returning(|_| {
            Ok(r#"<html><head><title>shop</title></head><body>
                <span id="productTitle">Dell XPS 13 Laptop in great shape</span>
                <div id="corePrice_feature_div">$450.00 with free local pickup today</div>
            </body></html>"#
                .to_string())
        });

        let tool = ScrapeListingTool::new(Arc::new(fetcher), ReducerConfig::default());
        let out = tool
            .invoke(json!({"url": "https://example.com/listing"}))
            .await
            .unwrap();

        assert!(out.contains("Title: Dell XPS 13 Laptop"));
        assert!(out.contains("Price: $450.00"));
        assert!(out.contains("Content:"));
    }

    #[tokio::test]
    async fn test_scrape_tool_requires_url() {
        let fetcher = MockPageFetcher::new();
        let tool = ScrapeListingTool::new(Arc::new(fetcher), ReducerConfig::default());
        assert!(tool.invoke(json!({})).await.is_err());
    }
}
