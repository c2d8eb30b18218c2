use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

pub const PUSHOVER_URL: &str = "https://api.pushover.net/1/messages.json";

/// Delivers short text notifications to the owner of the representative
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn push(&self, message: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PushoverConfig {
    pub user: String,
    pub token: String,
    #[serde(default = "default_pushover_url")]
    pub url: String,
}

fn default_pushover_url() -> String {
    PUSHOVER_URL.to_string()
}

/// Sends notifications through the Pushover messages API
pub struct PushoverNotifier {
    client: Client,
    config: PushoverConfig,
}

impl PushoverNotifier {
    pub fn new(config: PushoverConfig) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Notifier for PushoverNotifier {
    async fn push(&self, message: &str) -> Result<()> {
        tracing::info!("Push: {}", message);
        let payload = [
            ("user", self.config.user.as_str()),
            ("token", self.config.token.as_str()),
            ("message", message),
        ];

        let response = self
            .client
            .post(&self.config.url)
            .form(&payload)
            .send()
            .await?;

        // Delivery is best effort, a rejected push must not end the conversation
        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Pushover rejected notification");
        }
        Ok(())
    }
}

/// Pushover when it is configured, the log otherwise
pub fn notifier_from(config: Option<PushoverConfig>) -> Result<Arc<dyn Notifier>> {
    match config {
        Some(config) => Ok(Arc::new(PushoverNotifier::new(config)?)),
        None => {
            tracing::warn!("Pushover is not configured, notifications will only be logged");
            Ok(Arc::new(LogNotifier))
        }
    }
}

/// Writes notifications to the log only, for running without Pushover credentials
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn push(&self, message: &str) -> Result<()> {
        tracing::info!("Push (not delivered): {}", message);
        Ok(())
    }
}
