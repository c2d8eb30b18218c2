use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use super::System;
use crate::errors::{AgentError, AgentResult};
use crate::models::tool::{Tool, ToolCall};
use crate::notify::Notifier;

const RECORD_USER_DETAILS: &str = "record_user_details";
const RECORD_UNKNOWN_QUESTION: &str = "record_unknown_question";

/// Lets the representative record interested visitors and questions it could not answer.
///
/// Both tools notify the owner and acknowledge with `{"recorded": "ok"}`.
pub struct LeadCaptureSystem {
    tools: Vec<Tool>,
    notifier: Arc<dyn Notifier>,
}

impl LeadCaptureSystem {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        let record_user_details = Tool::builder(
            RECORD_USER_DETAILS,
            "Use this tool to record that a user is interested in being in touch and provided an email address",
        )
        .param("email", "string", "The email address of this user", true)
        .param("name", "string", "The user's name, if they provided it", false)
        .param(
            "notes",
            "string",
            "Any additional information about the conversation that's worth recording to give context",
            false,
        )
        .build();

        let record_unknown_question = Tool::builder(
            RECORD_UNKNOWN_QUESTION,
            "Always use this tool to record any question that couldn't be answered as you didn't know the answer",
        )
        .param("question", "string", "The question that couldn't be answered", true)
        .build();

        Self {
            tools: vec![record_user_details, record_unknown_question],
            notifier,
        }
    }

    async fn record_user_details(&self, call: &ToolCall) -> AgentResult<Value> {
        let email = call
            .str_arg("email")
            .ok_or_else(|| AgentError::InvalidParameters("email parameter required".into()))?;
        let name = call.str_arg("name").unwrap_or("Name not provided");
        let notes = call.str_arg("notes").unwrap_or("not provided");

        self.push(&format!(
            "Recording interest from {} with email {} and notes {}",
            name, email, notes
        ))
        .await
    }

    async fn record_unknown_question(&self, call: &ToolCall) -> AgentResult<Value> {
        let question = call
            .str_arg("question")
            .ok_or_else(|| AgentError::InvalidParameters("question parameter required".into()))?;

        self.push(&format!(
            "Recording {} asked that I couldn't answer",
            question
        ))
        .await
    }

    async fn push(&self, message: &str) -> AgentResult<Value> {
        self.notifier
            .push(message)
            .await
            .map_err(|e| AgentError::ExecutionError(e.to_string()))?;
        Ok(json!({"recorded": "ok"}))
    }
}

#[async_trait]
impl System for LeadCaptureSystem {
    fn name(&self) -> &str {
        "lead_capture"
    }

    fn description(&self) -> &str {
        "Records visitor contact details and unanswered questions for follow-up"
    }

    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call(&self, tool_call: ToolCall) -> AgentResult<Value> {
        match tool_call.name.as_str() {
            RECORD_USER_DETAILS => self.record_user_details(&tool_call).await,
            RECORD_UNKNOWN_QUESTION => self.record_unknown_question(&tool_call).await,
            _ => Err(AgentError::ToolNotFound(tool_call.name)),
        }
    }
}
