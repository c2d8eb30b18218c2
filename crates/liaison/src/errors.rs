use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum AgentError {
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Tool execution failed: {0}")]
    ExecutionError(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Model call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Tool loop exceeded {0} iterations without a final answer")]
    ToolLoopExceeded(usize),

    #[error("No candidate outputs were produced")]
    NoCandidates,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AgentError {
    fn from(err: anyhow::Error) -> Self {
        AgentError::Provider(format!("{:#}", err))
    }
}

pub type AgentResult<T> = Result<T, AgentError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("Failed to read {path}: {source}")]
    Document {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render prompt: {0}")]
    Template(#[from] tera::Error),

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// Map a dotted settings key such as `provider.api_key` to the environment
/// variable that sets it.
pub fn to_env_var(field_path: &str) -> String {
    let mut env_var = String::from("LIAISON_");
    env_var.push_str(&field_path.replace('.', "__").to_uppercase());
    env_var
}
