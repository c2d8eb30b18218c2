use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::message::Message;
use crate::models::tool::Tool;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// Why the model stopped generating
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The model wants the caller to run tools before it continues
    ToolCalls,
    Stop,
    Length,
    Other(String),
}

impl FinishReason {
    pub fn parse(reason: Option<&str>) -> Self {
        match reason {
            Some("tool_calls") | Some("function_call") => FinishReason::ToolCalls,
            Some("stop") | None => FinishReason::Stop,
            Some("length") => FinishReason::Length,
            Some(other) => FinishReason::Other(other.to_string()),
        }
    }
}

/// One model response
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub message: Message,
    pub finish_reason: FinishReason,
    pub usage: Usage,
}

impl Completion {
    pub fn new(message: Message, finish_reason: FinishReason, usage: Usage) -> Self {
        Self {
            message,
            finish_reason,
            usage,
        }
    }

    /// True when the caller must execute tools and invoke the model again.
    ///
    /// Decided by the message content; a `tool_calls` finish reason with no requests is final.
    pub fn requests_tools(&self) -> bool {
        self.message.has_tool_requests()
    }
}

/// Base trait for AI providers (OpenAI, Gemini, etc)
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generate the next message for the given conversation.
    ///
    /// `messages` is the complete sequence, system message included; it is sent as-is.
    async fn complete(&self, model: &str, messages: &[Message], tools: &[Tool])
        -> Result<Completion>;
}
