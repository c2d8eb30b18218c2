use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use super::System;
use crate::errors::{AgentError, AgentResult};
use crate::models::message::ToolRequest;
use crate::models::tool::Tool;

/// Maps tool names to the system that executes them
#[derive(Clone, Default)]
pub struct ToolRegistry {
    systems: Vec<Arc<dyn System>>,
    routes: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every tool of a system. Tool names must be unique across systems.
    pub fn add_system(&mut self, system: Arc<dyn System>) -> AgentResult<()> {
        for tool in system.tools() {
            if self.routes.contains_key(&tool.name) {
                return Err(AgentError::Internal(format!(
                    "Tool {} registered twice (second time by system {})",
                    tool.name,
                    system.name()
                )));
            }
        }

        let index = self.systems.len();
        for tool in system.tools() {
            self.routes.insert(tool.name.clone(), index);
        }
        self.systems.push(system);
        Ok(())
    }

    pub fn with_system<S: System + 'static>(mut self, system: S) -> AgentResult<Self> {
        self.add_system(Arc::new(system))?;
        Ok(self)
    }

    /// All tool definitions, in registration order
    pub fn tools(&self) -> Vec<Tool> {
        self.systems
            .iter()
            .flat_map(|system| system.tools().iter().cloned())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Execute a single tool request.
    ///
    /// Unknown tool names produce an empty object rather than an error; requests the
    /// model sent malformed and failures inside the tool are returned as errors.
    pub async fn dispatch(&self, request: &ToolRequest) -> AgentResult<Value> {
        let call = request.tool_call.clone()?;
        tracing::info!(tool = %call.name, id = %request.id, "Tool called");

        match self.routes.get(&call.name) {
            Some(&index) => self.systems[index].call(call).await,
            None => {
                tracing::warn!(tool = %call.name, "No system registered for tool");
                Ok(json!({}))
            }
        }
    }
}
