use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::providers::base::{Completion, FinishReason, Provider, Usage};

/// A mock provider that returns pre-configured responses for testing
#[derive(Clone, Default)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<Result<Message, String>>>>,
    calls: Arc<Mutex<Vec<Vec<Message>>>>,
    delay: Option<Duration>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(responses: Vec<Message>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into_iter().map(Ok).collect())),
            ..Default::default()
        }
    }

    /// A provider whose every call fails with the given message
    pub fn failing(message: &str) -> Self {
        Self {
            responses: Arc::new(Mutex::new(vec![Err(message.to_string())])),
            ..Default::default()
        }
    }

    /// Wait before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// The message sequences received so far, one per call
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        _model: &str,
        messages: &[Message],
        _tools: &[Tool],
    ) -> Result<Completion> {
        self.calls.lock().unwrap().push(messages.to_vec());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = {
            let mut responses = self.responses.lock().unwrap();
            match responses.first() {
                // Failures are sticky
                Some(Err(e)) => Err(e.clone()),
                Some(Ok(_)) => responses.remove(0),
                // Return empty response if no more pre-configured responses
                None => Ok(Message::assistant().with_text("")),
            }
        };

        let message = next.map_err(|e| anyhow!(e))?;
        let finish_reason = if message.has_tool_requests() {
            FinishReason::ToolCalls
        } else {
            FinishReason::Stop
        };
        Ok(Completion::new(message, finish_reason, Usage::default()))
    }
}
