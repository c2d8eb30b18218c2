use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use super::System;
use crate::agent::Agent;
use crate::errors::{AgentError, AgentResult};
use crate::models::tool::{Tool, ToolCall};

/// Exposes a whole agent as a single tool that another agent can call
pub struct AgentTool {
    name: String,
    description: String,
    tools: Vec<Tool>,
    agent: Arc<Agent>,
}

impl AgentTool {
    pub fn new<N, D>(name: N, description: D, agent: Arc<Agent>) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        let name = name.into();
        let description = description.into();
        let tool = Tool::builder(name.clone(), description.clone())
            .param("input", "string", "The task for the agent", true)
            .build();

        Self {
            name,
            description,
            tools: vec![tool],
            agent,
        }
    }
}

#[async_trait]
impl System for AgentTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call(&self, tool_call: ToolCall) -> AgentResult<Value> {
        if tool_call.name != self.name {
            return Err(AgentError::ToolNotFound(tool_call.name));
        }
        let input = tool_call
            .str_arg("input")
            .ok_or_else(|| AgentError::InvalidParameters("input parameter required".into()))?;

        tracing::info!(agent = %self.agent.name(), "Delegating to agent");
        let output = self.agent.run(input).await?;
        Ok(json!({"output": output.output}))
    }
}
