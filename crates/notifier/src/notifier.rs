use crate::channels::{CustomWebhookChannel, FeishuChannel, PushoverChannel, TelegramChannel, WeChatChannel};
use crate::email::EmailChannel;
use signal_core::NotificationChannel;
use std::sync::Arc;

/// Per-channel credentials/URLs; an empty value leaves that channel
/// disabled. `max_bytes` defaults match the original Feishu cap and are
/// applied uniformly across channels for simplicity.
#[derive(Debug, Clone, Default)]
pub struct NotifierConfig {
    pub wechat_webhook_url: Option<String>,
    pub feishu_webhook_url: Option<String>,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub email_sender: Option<String>,
    pub email_password: Option<String>,
    pub email_receivers: Vec<String>,
    pub pushover_user_key: Option<String>,
    pub pushover_api_token: Option<String>,
    pub custom_webhook_urls: Vec<String>,
    pub custom_webhook_bearer_token: Option<String>,
    pub max_bytes: usize,
}

fn nonempty(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

pub struct DispatchResult {
    pub all_succeeded: bool,
    pub channel_results: Vec<(String, bool)>,
}

pub struct Notifier {
    channels: Vec<Arc<dyn NotificationChannel>>,
}

impl Notifier {
    pub fn new(config: &NotifierConfig) -> Self {
        let max_bytes = if config.max_bytes > 0 { config.max_bytes } else { 20_000 };
        let mut channels: Vec<Arc<dyn NotificationChannel>> = Vec::new();

        if nonempty(&config.wechat_webhook_url) {
            channels.push(Arc::new(WeChatChannel::new(config.wechat_webhook_url.clone().unwrap(), max_bytes)));
        }
        if nonempty(&config.feishu_webhook_url) {
            channels.push(Arc::new(FeishuChannel::new(config.feishu_webhook_url.clone().unwrap(), max_bytes)));
        }
        if nonempty(&config.telegram_bot_token) && nonempty(&config.telegram_chat_id) {
            channels.push(Arc::new(TelegramChannel::new(
                config.telegram_bot_token.clone().unwrap(),
                config.telegram_chat_id.clone().unwrap(),
                max_bytes,
            )));
        }
        if nonempty(&config.pushover_user_key) && nonempty(&config.pushover_api_token) {
            channels.push(Arc::new(PushoverChannel::new(
                config.pushover_user_key.clone().unwrap(),
                config.pushover_api_token.clone().unwrap(),
                max_bytes,
            )));
        }
        if !config.custom_webhook_urls.is_empty() {
            channels.push(Arc::new(CustomWebhookChannel::new(
                config.custom_webhook_urls.clone(),
                config.custom_webhook_bearer_token.clone(),
                max_bytes,
            )));
        }
        if nonempty(&config.email_sender) && nonempty(&config.email_password) && !config.email_receivers.is_empty() {
            match EmailChannel::new(
                config.email_sender.as_deref().unwrap(),
                config.email_password.as_deref().unwrap(),
                config.email_receivers.clone(),
            ) {
                Ok(channel) => channels.push(Arc::new(channel)),
                Err(err) => tracing::warn!(%err, "failed to initialize email channel, skipping"),
            }
        }

        if channels.is_empty() {
            tracing::info!("no notification channels configured");
        }

        Self { channels }
    }

    /// Formats nothing itself — `content` is the already-rendered
    /// report — and fans out to every enabled channel concurrently, one
    /// worker per channel. A failing channel never blocks the others.
    pub async fn send(&self, content: &str) -> DispatchResult {
        let mut handles = Vec::with_capacity(self.channels.len());
        for channel in &self.channels {
            let channel = channel.clone();
            let content = content.to_string();
            handles.push(tokio::spawn(async move {
                let ok = channel.send(&content).await;
                (channel.name().to_string(), ok)
            }));
        }

        let mut channel_results = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok((name, ok)) => {
                    if !ok {
                        tracing::warn!(channel = name.as_str(), "notification delivery failed");
                    }
                    channel_results.push((name, ok));
                }
                Err(err) => {
                    tracing::error!(%err, "notification worker panicked");
                }
            }
        }

        let all_succeeded = !channel_results.is_empty() && channel_results.iter().all(|(_, ok)| *ok);
        DispatchResult { all_succeeded, channel_results }
    }
}
