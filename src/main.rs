//! flipbot — resale arbitrage analysis bot

use std::sync::Arc;

use clap::{Parser, Subcommand};
use flipbot::{
    agent::tools::{MarginTool, MarketValueTool, ScrapeListingTool},
    agent::{AgentRunner, ToolRegistry},
    analyzer::Analyzer,
    client::{LlmClient, PageFetcher, ScrapeClient},
    config::Config,
    margin,
    payment::PaymentClient,
    server::{self, AppState},
    storage::{MemoryStore, SqliteStore, UsageStore},
    telegram::TelegramBot,
};
use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "flipbot")]
#[command(about = "Scores marketplace listings as resale flips")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full bot: Telegram listener plus the REST/webhook server
    Run,
    /// Run only the REST/webhook server
    Serve,
    /// Analyze a single listing URL and print the report
    Analyze {
        /// Listing URL
        url: String,
    },
    /// Run the fee/margin calculator directly
    Margin {
        /// Expected resale price in USD
        sale_price: Decimal,
        /// Purchase price in USD
        cost_of_goods: Decimal,
        /// Product category, e.g. electronics
        #[arg(short = 'k', long)]
        category: Option<String>,
    },
    /// Send a test message through the Telegram send API
    TestNotify,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Run => run_bot(config).await,
        Commands::Serve => run_server(config).await,
        Commands::Analyze { url } => analyze_one(config, &url).await,
        Commands::Margin {
            sale_price,
            cost_of_goods,
            category,
        } => print_margin(config, sale_price, cost_of_goods, category.as_deref()),
        Commands::TestNotify => test_notify(config).await,
    }
}

/// Wire up the analyzer from configuration.
fn build_analyzer(config: &Config) -> anyhow::Result<Arc<Analyzer>> {
    let fetcher: Arc<dyn PageFetcher> = Arc::new(ScrapeClient::new(&config.scrape)?);

    let agent = match &config.llm {
        Some(llm_config) => {
            let mut registry = ToolRegistry::new();
            registry.register(Arc::new(ScrapeListingTool::new(
                fetcher.clone(),
                config.reducer.clone(),
            )));
            registry.register(Arc::new(MarginTool::new(config.fees.policy())));
            registry.register(Arc::new(MarketValueTool));

            tracing::info!(provider = %llm_config.provider, "LLM agent enabled");
            Some(
                AgentRunner::new(LlmClient::new(llm_config.clone()), registry)
                    .with_max_steps(llm_config.max_steps),
            )
        }
        None => {
            tracing::warn!("No LLM configured, every scan will use the local fallback");
            None
        }
    };

    Ok(Arc::new(Analyzer::new(
        fetcher,
        config.reducer.clone(),
        agent,
        config.fees.policy(),
    )))
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn UsageStore>> {
    match &config.storage {
        Some(storage) => {
            tracing::info!(path = %storage.path, "using SQLite usage store");
            Ok(Arc::new(SqliteStore::connect(&storage.path).await?))
        }
        None => {
            tracing::warn!("No storage configured, usage counters will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

fn build_state(
    config: &Config,
    analyzer: Arc<Analyzer>,
    store: Arc<dyn UsageStore>,
) -> Arc<AppState> {
    Arc::new(AppState {
        analyzer,
        store,
        payment_webhook_secret: config.payment.as_ref().map(|p| p.webhook_secret.clone()),
        social_webhook_secret: config.social.as_ref().map(|s| s.webhook_secret.clone()),
    })
}

async fn run_bot(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting flipbot");

    let analyzer = build_analyzer(&config)?;
    let store = build_store(&config).await?;

    let payment = match &config.payment {
        Some(payment_config) => Some(Arc::new(PaymentClient::new(payment_config)?)),
        None => None,
    };

    let state = build_state(&config, analyzer.clone(), store.clone());
    let bind = config.server.bind.clone();
    tokio::spawn(async move {
        if let Err(e) = server::serve(&bind, state).await {
            tracing::error!("API server error: {}", e);
        }
    });

    let telegram = config
        .telegram
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("[telegram] must be configured for `run`"))?;

    let bot = Arc::new(TelegramBot::new(
        telegram.bot_token.clone(),
        analyzer,
        store,
        payment,
        config.limits.free_scans,
        config.limits.max_concurrent_scans,
    ));

    bot.start_polling().await;
    Ok(())
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    let analyzer = build_analyzer(&config)?;
    let store = build_store(&config).await?;
    let state = build_state(&config, analyzer, store);
    server::serve(&config.server.bind, state).await
}

async fn analyze_one(config: Config, url: &str) -> anyhow::Result<()> {
    let analyzer = build_analyzer(&config)?;
    let report = analyzer.analyze(url).await?;

    println!("\n{}\n", "=".repeat(60));
    println!("Analyzing: {}", report.url);
    println!("{}\n", "=".repeat(60));
    println!("{}", report.markdown);
    Ok(())
}

fn print_margin(
    config: Config,
    sale_price: Decimal,
    cost_of_goods: Decimal,
    category: Option<&str>,
) -> anyhow::Result<()> {
    let result =
        margin::compute(sale_price, cost_of_goods, category, &config.fees.policy())?.rounded();

    println!("\n💰 Margin breakdown\n");
    println!("Category:        {}", result.category);
    println!("Sale price:      ${}", result.sale_price);
    println!("Cost of goods:   ${}", result.cost_of_goods);
    println!("Referral fee:    ${}", result.referral_fee);
    println!("Fulfillment fee: ${}", result.fulfillment_fee);
    println!("Net profit:      ${}", result.net_profit);
    println!("ROI:             {}%", result.roi_percent);
    Ok(())
}

async fn test_notify(config: Config) -> anyhow::Result<()> {
    let telegram = config
        .telegram
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("Telegram not configured in config.toml"))?;
    let chat_id = telegram
        .admin_chat_id
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("telegram.admin_chat_id not configured"))?;

    let analyzer = build_analyzer(&config)?;
    let store: Arc<dyn UsageStore> = Arc::new(MemoryStore::new());
    let bot = TelegramBot::new(
        telegram.bot_token.clone(),
        analyzer,
        store,
        None,
        config.limits.free_scans,
        config.limits.max_concurrent_scans,
    );

    bot.reply(
        chat_id,
        "🧪 *Test Notification*\n\nIf you see this, Telegram integration is working!",
    )
    .await;

    println!("✅ Test notification sent!");
    Ok(())
}
