use crate::util::truncate_utf8;
use async_trait::async_trait;
use reqwest::Client;
use signal_core::NotificationChannel;
use std::time::Duration;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

pub struct WeChatChannel {
    webhook_url: String,
    client: Client,
    max_bytes: usize,
}

impl WeChatChannel {
    pub fn new(webhook_url: impl Into<String>, max_bytes: usize) -> Self {
        Self { webhook_url: webhook_url.into(), client: Client::new(), max_bytes }
    }
}

#[async_trait]
impl NotificationChannel for WeChatChannel {
    fn name(&self) -> &str {
        "wechat"
    }

    async fn send(&self, content: &str) -> bool {
        let content = truncate_utf8(content, self.max_bytes);
        let body = serde_json::json!({"msgtype": "markdown", "markdown": {"content": content}});
        match self.client.post(&self.webhook_url).json(&body).timeout(HTTP_TIMEOUT).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(err) => {
                tracing::error!(channel = self.name(), %err, "send failed");
                false
            }
        }
    }
}

pub struct FeishuChannel {
    webhook_url: String,
    client: Client,
    max_bytes: usize,
}

impl FeishuChannel {
    pub fn new(webhook_url: impl Into<String>, max_bytes: usize) -> Self {
        Self { webhook_url: webhook_url.into(), client: Client::new(), max_bytes }
    }
}

#[async_trait]
impl NotificationChannel for FeishuChannel {
    fn name(&self) -> &str {
        "feishu"
    }

    async fn send(&self, content: &str) -> bool {
        let content = truncate_utf8(content, self.max_bytes);
        let body = serde_json::json!({"msg_type": "text", "content": {"text": content}});
        match self.client.post(&self.webhook_url).json(&body).timeout(HTTP_TIMEOUT).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(err) => {
                tracing::error!(channel = self.name(), %err, "send failed");
                false
            }
        }
    }
}

pub struct TelegramChannel {
    bot_token: String,
    chat_id: String,
    client: Client,
    max_bytes: usize,
}

impl TelegramChannel {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>, max_bytes: usize) -> Self {
        Self { bot_token: bot_token.into(), chat_id: chat_id.into(), client: Client::new(), max_bytes }
    }
}

#[async_trait]
impl NotificationChannel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, content: &str) -> bool {
        let content = truncate_utf8(content, self.max_bytes);
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);
        let body = serde_json::json!({"chat_id": self.chat_id, "text": content, "parse_mode": "Markdown"});
        match self.client.post(&url).json(&body).timeout(HTTP_TIMEOUT).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(err) => {
                tracing::error!(channel = self.name(), %err, "send failed");
                false
            }
        }
    }
}

pub struct PushoverChannel {
    user_key: String,
    api_token: String,
    client: Client,
    max_bytes: usize,
}

impl PushoverChannel {
    pub fn new(user_key: impl Into<String>, api_token: impl Into<String>, max_bytes: usize) -> Self {
        Self { user_key: user_key.into(), api_token: api_token.into(), client: Client::new(), max_bytes }
    }
}

#[async_trait]
impl NotificationChannel for PushoverChannel {
    fn name(&self) -> &str {
        "pushover"
    }

    async fn send(&self, content: &str) -> bool {
        let content = truncate_utf8(content, self.max_bytes);
        let form = [
            ("user", self.user_key.as_str()),
            ("token", self.api_token.as_str()),
            ("message", content.as_str()),
            ("title", "股票分析报告"),
        ];
        match self
            .client
            .post("https://api.pushover.net/1/messages.json")
            .form(&form)
            .timeout(HTTP_TIMEOUT)
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(err) => {
                tracing::error!(channel = self.name(), %err, "send failed");
                false
            }
        }
    }
}

pub struct CustomWebhookChannel {
    urls: Vec<String>,
    bearer_token: Option<String>,
    client: Client,
    max_bytes: usize,
}

impl CustomWebhookChannel {
    pub fn new(urls: Vec<String>, bearer_token: Option<String>, max_bytes: usize) -> Self {
        Self { urls, bearer_token, client: Client::new(), max_bytes }
    }
}

#[async_trait]
impl NotificationChannel for CustomWebhookChannel {
    fn name(&self) -> &str {
        "custom_webhook"
    }

    async fn send(&self, content: &str) -> bool {
        let content = truncate_utf8(content, self.max_bytes);
        let body = serde_json::json!({"message": content});
        let mut success = true;
        for url in &self.urls {
            let mut request = self.client.post(url.trim()).json(&body).timeout(HTTP_TIMEOUT);
            if let Some(token) = &self.bearer_token {
                request = request.bearer_auth(token);
            }
            match request.send().await {
                Ok(resp) if resp.status().is_success() => {}
                Ok(resp) => {
                    tracing::error!(channel = self.name(), url, status = %resp.status(), "non-success response");
                    success = false;
                }
                Err(err) => {
                    tracing::error!(channel = self.name(), url, %err, "send failed");
                    success = false;
                }
            }
        }
        success
    }
}
