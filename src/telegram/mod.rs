//! Telegram bot surface
//!
//! Long-polls `getUpdates` and treats any message containing a URL as a scan
//! request. Non-pro users get a fixed number of free scans before being
//! pointed at the checkout. Scans run on a semaphore-bounded pool: when all
//! permits are busy the bot sheds load with a "busy" reply instead of
//! queueing without bound.

#[cfg(test)]
mod tests;

use std::sync::Arc;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, Semaphore};

use crate::analyzer::Analyzer;
use crate::error::Result;
use crate::payment::PaymentClient;
use crate::storage::UsageStore;
use crate::utils::{extract_urls, truncate_chars};

/// Telegram caps message text at 4096 characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

const TELEGRAM_API: &str = "https://api.telegram.org";

#[derive(Debug, Deserialize)]
struct TelegramUpdate {
    update_id: i64,
    message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
struct TelegramMessage {
    chat: TelegramChat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramChat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct GetUpdatesResponse {
    #[allow(dead_code)]
    ok: bool,
    result: Vec<TelegramUpdate>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest {
    chat_id: String,
    text: String,
    parse_mode: String,
}

pub struct TelegramBot {
    http: Client,
    bot_token: String,
    analyzer: Arc<Analyzer>,
    store: Arc<dyn UsageStore>,
    payment: Option<Arc<PaymentClient>>,
    free_scan_limit: u32,
    scan_permits: Arc<Semaphore>,
    last_update_id: RwLock<i64>,
}

impl TelegramBot {
    pub fn new(
        bot_token: String,
        analyzer: Arc<Analyzer>,
        store: Arc<dyn UsageStore>,
        payment: Option<Arc<PaymentClient>>,
        free_scan_limit: u32,
        max_concurrent_scans: usize,
    ) -> Self {
        Self {
            http: Client::new(),
            bot_token,
            analyzer,
            store,
            payment,
            free_scan_limit,
            scan_permits: Arc::new(Semaphore::new(max_concurrent_scans)),
            last_update_id: RwLock::new(0),
        }
    }

    /// Poll for updates until the process exits.
    pub async fn start_polling(self: Arc<Self>) {
        tracing::info!("Starting Telegram listener...");

        loop {
            match self.poll_updates().await {
                Ok(updates) => {
                    for update in updates {
                        {
                            let mut last_id = self.last_update_id.write().await;
                            *last_id = update.update_id + 1;
                        }

                        if let Some(msg) = update.message {
                            if let Some(text) = msg.text {
                                self.clone().handle_message(msg.chat.id, text).await;
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to poll Telegram updates: {}", e);
                    tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;
                }
            }

            tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
        }
    }

    async fn poll_updates(&self) -> Result<Vec<TelegramUpdate>> {
        let last_id = *self.last_update_id.read().await;

        let url = format!(
            "{}/bot{}/getUpdates?offset={}&timeout=30",
            TELEGRAM_API, self.bot_token, last_id
        );

        let response: GetUpdatesResponse = self.http.get(&url).send().await?.json().await?;
        Ok(response.result)
    }

    async fn handle_message(self: Arc<Self>, chat_id: i64, text: String) {
        let text = text.trim();
        let user_id = chat_id.to_string();

        if let Some(command) = parse_command(text) {
            self.handle_command(&user_id, command).await;
            return;
        }

        let Some(url) = extract_urls(text).into_iter().next() else {
            self.reply(
                &user_id,
                "Send me a product listing URL and I'll score the flip. /help for commands.",
            )
            .await;
            return;
        };

        if !self.check_paywall(&user_id).await {
            return;
        }

        // Bounded worker pool: shed load instead of queueing a burst.
        let permit = match self.scan_permits.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                self.reply(
                    &user_id,
                    "⏳ All scan slots are busy right now, try again in a minute.",
                )
                .await;
                return;
            }
        };

        let bot = self.clone();
        tokio::spawn(async move {
            let _permit = permit;
            match bot.analyzer.analyze(&url).await {
                Ok(report) => bot.reply(&user_id, &report.markdown).await,
                Err(e) => {
                    tracing::error!("Scan failed for {}: {}", url, e);
                    bot.reply(&user_id, "⚠️ Something went wrong analyzing that listing.")
                        .await;
                }
            }
        });
    }

    async fn handle_command(&self, user_id: &str, command: Command<'_>) {
        match command.name {
            "start" | "help" => {
                self.reply(
                    user_id,
                    "🤖 *flipbot*\n\n\
                    Send a product listing URL to get a flip analysis.\n\n\
                    /status - scans used and tier\n\
                    /upgrade - unlock unlimited scans\n\
                    /help - this message",
                )
                .await;
            }
            "status" => {
                let count = self.store.scan_count(user_id).await.unwrap_or(0);
                let pro = self.store.is_pro(user_id).await.unwrap_or(false);
                let tier = if pro {
                    "pro (unlimited scans)".to_string()
                } else {
                    format!("free ({count}/{} scans used)", self.free_scan_limit)
                };
                self.reply(user_id, &format!("📊 *Status*\n\nTier: {tier}"))
                    .await;
            }
            "upgrade" => {
                self.send_checkout(user_id).await;
            }
            other => {
                self.reply(
                    user_id,
                    &format!("❓ Unknown command: /{other}\nUse /help for available commands"),
                )
                .await;
            }
        }
    }

    /// Returns false (after replying) when the user is out of free scans.
    async fn check_paywall(&self, user_id: &str) -> bool {
        match self.store.is_pro(user_id).await {
            Ok(true) => return true,
            Ok(false) => {}
            Err(e) => {
                tracing::error!("Usage store failure for {}: {}", user_id, e);
                // Fail open: a broken store must not lock paying users out.
                return true;
            }
        }

        let used = self.store.scan_count(user_id).await.unwrap_or(0);
        if used >= self.free_scan_limit {
            self.reply(
                user_id,
                &format!(
                    "🔒 You've used all {} free scans.\nUse /upgrade to unlock unlimited scans.",
                    self.free_scan_limit
                ),
            )
            .await;
            return false;
        }

        if let Err(e) = self.store.record_scan(user_id).await {
            tracing::error!("Failed to record scan for {}: {}", user_id, e);
        }
        true
    }

    async fn send_checkout(&self, user_id: &str) {
        let Some(payment) = &self.payment else {
            self.reply(user_id, "Payments are not configured on this bot.")
                .await;
            return;
        };

        if self.store.is_pro(user_id).await.unwrap_or(false) {
            self.reply(user_id, "You're already on the pro tier 🎉").await;
            return;
        }

        match payment.create_charge(user_id).await {
            Ok(charge) => {
                self.reply(
                    user_id,
                    &format!(
                        "💳 *Upgrade to pro*\n\nPay here to unlock unlimited scans:\n{}",
                        charge.hosted_url
                    ),
                )
                .await;
            }
            Err(e) => {
                tracing::error!("Checkout creation failed for {}: {}", user_id, e);
                self.reply(
                    user_id,
                    "⚠️ Could not create a checkout right now, try again later.",
                )
                .await;
            }
        }
    }

    /// Send a markdown message, capped at the Telegram length limit.
    pub async fn reply(&self, chat_id: &str, text: &str) {
        let url = format!("{}/bot{}/sendMessage", TELEGRAM_API, self.bot_token);

        let request = SendMessageRequest {
            chat_id: chat_id.to_string(),
            text: truncate_chars(text, MAX_MESSAGE_CHARS).to_string(),
            parse_mode: "Markdown".to_string(),
        };

        if let Err(e) = self.http.post(&url).json(&request).send().await {
            tracing::error!("Failed to send Telegram reply: {}", e);
        }
    }
}

/// A parsed `/command` with its argument tail.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Command<'a> {
    pub name: &'a str,
    #[allow(dead_code)]
    pub args: &'a str,
}

/// Parse a leading slash command, stripping any `@botname` suffix.
/// Non-command text returns `None`.
pub(crate) fn parse_command(text: &str) -> Option<Command<'_>> {
    let rest = text.strip_prefix('/')?;
    let mut parts = rest.splitn(2, ' ');
    let raw = parts.next().unwrap_or("");
    let name = raw.split('@').next().unwrap_or(raw);
    if name.is_empty() {
        return None;
    }
    Some(Command {
        name,
        args: parts.next().map(str::trim).unwrap_or(""),
    })
}
