use async_trait::async_trait;
use serde_json::Value;

use crate::errors::AgentResult;
use crate::models::tool::{Tool, ToolCall};

/// Core trait that defines a system that can be operated by an AI agent
#[async_trait]
pub trait System: Send + Sync {
    /// Get the name of the system
    fn name(&self) -> &str;

    /// Get the system description
    fn description(&self) -> &str;

    /// Get available tools
    fn tools(&self) -> &[Tool];

    /// Call a tool with the given parameters.
    ///
    /// The returned value is a small JSON object; it is serialized verbatim into the
    /// tool-result message the model sees next.
    async fn call(&self, tool_call: ToolCall) -> AgentResult<Value>;
}
