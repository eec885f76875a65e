//! Tests for configuration

#[cfg(test)]
mod tests {
    use super::super::config::*;
    use crate::margin::FeePolicy;
    use rust_decimal_macros::dec;

    #[test]
    fn test_scrape_config_defaults() {
        let toml_str = r#"
api_key = "key-123"
"#;
        let config: ScrapeConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_key, "key-123");
        assert_eq!(config.base_url, "https://api.scraperapi.com");
        assert_eq!(config.country_code, "us");
        assert!(!config.premium);
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_scrape_config_overrides() {
        let toml_str = r#"
base_url = "https://scrape.example.com"
api_key = "key-123"
country_code = "de"
premium = true
timeout_secs = 20
"#;
        let config: ScrapeConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.base_url, "https://scrape.example.com");
        assert_eq!(config.country_code, "de");
        assert!(config.premium);
        assert_eq!(config.timeout_secs, 20);
    }

    #[test]
    fn test_llm_config_minimal() {
        let toml_str = r#"
provider = "deepseek"
api_key = "sk-xxx"
"#;
        let config: LlmConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.provider, "deepseek");
        assert_eq!(config.api_key, "sk-xxx");
        assert!(config.model.is_none());
        assert!(config.base_url.is_none());
        assert_eq!(config.max_steps, 6);
    }

    #[test]
    fn test_llm_config_ollama_needs_no_key() {
        let toml_str = r#"
provider = "ollama"
base_url = "http://localhost:11434"
max_steps = 3
"#;
        let config: LlmConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_key, "");
        assert_eq!(config.max_steps, 3);
    }

    #[test]
    fn test_telegram_config() {
        let toml_str = r#"
bot_token = "123:abc"
"#;
        let config: TelegramConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.bot_token, "123:abc");
        assert!(config.admin_chat_id.is_none());
    }

    #[test]
    fn test_payment_config_defaults() {
        let toml_str = r#"
api_key = "cc-key"
webhook_secret = "whsec"
"#;
        let config: PaymentConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.base_url, "https://api.commerce.coinbase.com");
        assert_eq!(config.checkout_price_usd, dec!(9.99));
    }

    #[test]
    fn test_fees_config_defaults() {
        let config: FeesConfig = toml::from_str("").unwrap();
        assert_eq!(config.policy, "categorized");
        assert_eq!(config.fulfillment_fee, dec!(5.25));
        assert_eq!(config.flat_rate, dec!(0.13));
    }

    #[test]
    fn test_fees_policy_resolution() {
        let categorized: FeesConfig = toml::from_str("fulfillment_fee = 3.22").unwrap();
        assert_eq!(
            categorized.policy(),
            FeePolicy::Categorized {
                fulfillment_fee: dec!(3.22)
            }
        );

        let flat: FeesConfig = toml::from_str(r#"policy = "flat""#).unwrap();
        assert_eq!(flat.policy(), FeePolicy::Flat { rate: dec!(0.13) });
    }

    #[test]
    fn test_limits_config_defaults() {
        let config: LimitsConfig = toml::from_str("").unwrap();
        assert_eq!(config.free_scans, 3);
        assert_eq!(config.max_concurrent_scans, 4);
    }

    #[test]
    fn test_server_config_default_bind() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.bind, "0.0.0.0:8080");
    }

    #[test]
    fn test_reducer_section_deserializes() {
        let config: crate::reduce::ReducerConfig =
            toml::from_str("max_chars = 1500\nmin_signal_chars = 10").unwrap();
        assert_eq!(config.max_chars, 1500);
        assert_eq!(config.min_signal_chars, 10);
    }

    #[test]
    fn test_full_config_minimal() {
        let toml_str = r#"
[scrape]
api_key = "key-123"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.llm.is_none());
        assert!(config.telegram.is_none());
        assert!(config.payment.is_none());
        assert!(config.social.is_none());
        assert!(config.storage.is_none());
        assert_eq!(config.limits.free_scans, 3);
        assert_eq!(config.reducer.max_chars, 8000);
    }

    #[test]
    fn test_full_config_all_sections() {
        let toml_str = r#"
[scrape]
api_key = "key-123"

[llm]
provider = "openai"
api_key = "sk-xxx"
model = "gpt-4o-mini"

[telegram]
bot_token = "123:abc"
admin_chat_id = "42"

[payment]
api_key = "cc-key"
webhook_secret = "whsec"
checkout_price_usd = 4.99

[social]
webhook_secret = "social-secret"

[fees]
policy = "flat"

[limits]
free_scans = 5
max_concurrent_scans = 2

[storage]
path = "data/flipbot.db"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.llm.unwrap().model, Some("gpt-4o-mini".to_string()));
        assert_eq!(config.telegram.unwrap().admin_chat_id, Some("42".to_string()));
        assert_eq!(config.payment.unwrap().checkout_price_usd, dec!(4.99));
        assert_eq!(config.social.unwrap().webhook_secret, "social-secret");
        assert_eq!(config.fees.policy(), FeePolicy::Flat { rate: dec!(0.13) });
        assert_eq!(config.limits.free_scans, 5);
        assert_eq!(config.storage.unwrap().path, "data/flipbot.db");
    }
}
