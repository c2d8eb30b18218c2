//! Fan a prompt out to several agents, then narrow their answers down to one.

use futures::future::join_all;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::agent::{Agent, AgentOutput};
use crate::errors::{AgentError, AgentResult};
use crate::systems::EmailSystem;

pub const CANDIDATES_HEADER: &str = "Cold sales emails:";

/// What a round does when some of its agents fail
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Any failure fails the round
    #[default]
    Abort,
    /// Failed agents are dropped from the candidates
    Exclude,
}

pub struct Selector {
    agents: Vec<Arc<Agent>>,
    picker: Option<Arc<Agent>>,
    policy: FailurePolicy,
}

impl Selector {
    pub fn new(agents: Vec<Arc<Agent>>) -> Self {
        Self {
            agents,
            picker: None,
            policy: FailurePolicy::default(),
        }
    }

    /// Agent asked to choose one candidate out of the rendered list
    pub fn with_picker(mut self, picker: Arc<Agent>) -> Self {
        self.picker = Some(picker);
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run every agent on the prompt concurrently.
    ///
    /// Outputs are in the order the agents were configured, whatever order they finish in.
    /// Under [`FailurePolicy::Exclude`] failed agents are left out, so positions shift.
    pub async fn run_all(&self, prompt: &str) -> AgentResult<Vec<AgentOutput>> {
        let results = join_all(self.agents.iter().map(|agent| agent.run(prompt))).await;

        match self.policy {
            FailurePolicy::Abort => results.into_iter().collect(),
            FailurePolicy::Exclude => {
                let mut outputs = Vec::with_capacity(results.len());
                for (agent, result) in self.agents.iter().zip(results) {
                    match result {
                        Ok(output) => outputs.push(output),
                        Err(e) => {
                            tracing::warn!(agent = %agent.name(), error = %e, "Dropping failed agent")
                        }
                    }
                }
                if outputs.is_empty() && !self.agents.is_empty() {
                    return Err(AgentError::NoCandidates);
                }
                Ok(outputs)
            }
        }
    }

    /// Run every agent and return the single answer the picker prefers.
    /// Without a picker the first candidate wins.
    pub async fn pick_best(&self, prompt: &str) -> AgentResult<String> {
        let candidates = self.run_all(prompt).await?;
        if candidates.is_empty() {
            return Err(AgentError::NoCandidates);
        }

        match &self.picker {
            Some(picker) => {
                let rendered = render_candidates(&candidates);
                let chosen = picker.run(&rendered).await?;
                tracing::info!(picker = %picker.name(), "Picked best candidate");
                Ok(chosen.output)
            }
            None => Ok(candidates.into_iter().next().map(|c| c.output).unwrap_or_default()),
        }
    }

    /// Pick the best answer and send it as an email
    pub async fn deliver(&self, prompt: &str, email: &EmailSystem) -> AgentResult<Value> {
        let best = self.pick_best(prompt).await?;
        email.send_email(&best).await
    }
}

/// Render candidates as one labelled list, numbered from 1
pub fn render_candidates(candidates: &[AgentOutput]) -> String {
    let blocks: Vec<String> = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| format!("Candidate {} ({}):\n{}", i + 1, c.agent, c.output))
        .collect();
    format!("{}\n\n{}", CANDIDATES_HEADER, blocks.join("\n\n"))
}
