use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

pub const SENDGRID_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// A single outbound email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub content_type: String,
    pub body: String,
}

impl Email {
    pub fn plain_text(envelope: &Envelope, body: &str) -> Self {
        Self {
            from: envelope.from.clone(),
            to: envelope.to.clone(),
            subject: envelope.subject.clone(),
            content_type: "text/plain".to_string(),
            body: body.to_string(),
        }
    }
}

/// Fixed sender, recipient and subject used for every outbound email
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope {
    pub from: String,
    pub to: String,
    #[serde(default = "default_subject")]
    pub subject: String,
}

fn default_subject() -> String {
    "Sales email".to_string()
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Hand the email to the delivery service, returning the HTTP status it answered with
    async fn send(&self, email: &Email) -> Result<u16>;
}

/// Sends email through the SendGrid v3 mail API
pub struct SendGridClient {
    client: Client,
    api_key: String,
    url: String,
}

impl SendGridClient {
    pub fn new<K: Into<String>>(api_key: K) -> Result<Self> {
        Self::with_url(api_key, SENDGRID_URL)
    }

    pub fn with_url<K: Into<String>, U: Into<String>>(api_key: K, url: U) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            url: url.into(),
        })
    }
}

#[async_trait]
impl EmailSender for SendGridClient {
    async fn send(&self, email: &Email) -> Result<u16> {
        let payload = json!({
            "personalizations": [{"to": [{"email": email.to}]}],
            "from": {"email": email.from},
            "subject": email.subject,
            "content": [{"type": email.content_type, "value": email.body}]
        });

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        tracing::info!(status = status.as_u16(), to = %email.to, "Email handed to SendGrid");
        if status.is_success() {
            Ok(status.as_u16())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(anyhow!("SendGrid rejected email: {}\n{}", status, body))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn envelope() -> Envelope {
        Envelope {
            from: "sales@example.com".to_string(),
            to: "prospect@example.com".to_string(),
            subject: "Sales email".to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_builds_sendgrid_request() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/mail/send"))
            .and(header("Authorization", "Bearer sg-key"))
            .and(body_partial_json(json!({
                "personalizations": [{"to": [{"email": "prospect@example.com"}]}],
                "from": {"email": "sales@example.com"},
                "subject": "Sales email",
                "content": [{"type": "text/plain", "value": "Dear CEO"}]
            })))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let client = SendGridClient::with_url("sg-key", format!("{}/v3/mail/send", server.uri()))?;
        let status = client
            .send(&Email::plain_text(&envelope(), "Dear CEO"))
            .await?;
        assert_eq!(status, 202);
        Ok(())
    }

    #[tokio::test]
    async fn test_send_rejected() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = SendGridClient::with_url("bad", server.uri())?;
        let result = client.send(&Email::plain_text(&envelope(), "body")).await;
        assert!(result.unwrap_err().to_string().contains("401"));
        Ok(())
    }
}
