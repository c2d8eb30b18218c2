use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use super::System;
use crate::errors::{AgentError, AgentResult};
use crate::mail::{Email, EmailSender, Envelope};
use crate::models::tool::{Tool, ToolCall};

const SEND_EMAIL: &str = "send_email";

/// Delivery tool: sends one plain-text email with a fixed envelope
pub struct EmailSystem {
    tools: Vec<Tool>,
    sender: Arc<dyn EmailSender>,
    envelope: Envelope,
}

impl EmailSystem {
    pub fn new(sender: Arc<dyn EmailSender>, envelope: Envelope) -> Self {
        let send_email = Tool::builder(
            SEND_EMAIL,
            "Send out an email with the given body to all sales prospects",
        )
        .param("body", "string", "The full text of the email", true)
        .build();

        Self {
            tools: vec![send_email],
            sender,
            envelope,
        }
    }

    /// Send `body` directly, without going through a tool call
    pub async fn send_email(&self, body: &str) -> AgentResult<Value> {
        let email = Email::plain_text(&self.envelope, body);
        let code = self
            .sender
            .send(&email)
            .await
            .map_err(|e| AgentError::ExecutionError(e.to_string()))?;
        Ok(json!({"status": "success", "code": code}))
    }
}

#[async_trait]
impl System for EmailSystem {
    fn name(&self) -> &str {
        "email"
    }

    fn description(&self) -> &str {
        "Delivers finished emails through the configured email service"
    }

    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call(&self, tool_call: ToolCall) -> AgentResult<Value> {
        match tool_call.name.as_str() {
            SEND_EMAIL => {
                let body = tool_call.str_arg("body").ok_or_else(|| {
                    AgentError::InvalidParameters("body parameter required".into())
                })?;
                self.send_email(body).await
            }
            _ => Err(AgentError::ToolNotFound(tool_call.name)),
        }
    }
}
