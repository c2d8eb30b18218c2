use config::{Config, Environment};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::agent::{AgentLimits, DEFAULT_MAX_TOOL_ITERATIONS};
use crate::errors::{to_env_var, ConfigError};
use crate::mail::{Envelope, SENDGRID_URL};
use crate::notify::PushoverConfig;
use crate::providers::configs::{
    OpenAiProviderConfig, ProviderConfig, GEMINI_BASE_URL, OPENAI_BASE_URL,
};
use crate::providers::factory::ProviderType;
use crate::selector::FailurePolicy;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum ProviderSettings {
    OpenAi {
        #[serde(default = "default_openai_base_url")]
        base_url: String,
        api_key: String,
        #[serde(default = "default_openai_model")]
        model: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<i32>,
    },
    Gemini {
        #[serde(default = "default_gemini_base_url")]
        base_url: String,
        api_key: String,
        #[serde(default = "default_gemini_model")]
        model: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<i32>,
    },
}

impl ProviderSettings {
    pub fn provider_type(&self) -> ProviderType {
        match self {
            ProviderSettings::OpenAi { .. } => ProviderType::OpenAi,
            ProviderSettings::Gemini { .. } => ProviderType::Gemini,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            ProviderSettings::OpenAi { model, .. } | ProviderSettings::Gemini { model, .. } => {
                model
            }
        }
    }

    pub fn into_config(self) -> ProviderConfig {
        match self {
            ProviderSettings::OpenAi {
                base_url,
                api_key,
                temperature,
                max_tokens,
                ..
            } => ProviderConfig::OpenAi(OpenAiProviderConfig {
                temperature,
                max_tokens,
                ..OpenAiProviderConfig::new(base_url, api_key)
            }),
            ProviderSettings::Gemini {
                base_url,
                api_key,
                temperature,
                max_tokens,
                ..
            } => ProviderConfig::Gemini(OpenAiProviderConfig {
                temperature,
                max_tokens,
                ..OpenAiProviderConfig::new(base_url, api_key)
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentSettings {
    #[serde(default = "default_max_tool_iterations")]
    pub max_tool_iterations: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_tool_iterations: default_max_tool_iterations(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl AgentSettings {
    pub fn limits(&self) -> AgentLimits {
        AgentLimits {
            max_tool_iterations: self.max_tool_iterations,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PersonaSettings {
    pub name: String,
    #[serde(default = "default_summary_path")]
    pub summary_path: PathBuf,
    #[serde(default = "default_profile_path")]
    pub profile_path: PathBuf,
    #[serde(default)]
    pub template_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmailSettings {
    pub api_key: String,
    pub from: String,
    pub to: String,
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(default = "default_sendgrid_url")]
    pub url: String,
}

impl EmailSettings {
    pub fn envelope(&self) -> Envelope {
        Envelope {
            from: self.from.clone(),
            to: self.to.clone(),
            subject: self.subject.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SalesSettings {
    #[serde(default = "default_sales_prompt")]
    pub prompt: String,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl Default for SalesSettings {
    fn default() -> Self {
        Self {
            prompt: default_sales_prompt(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

/// Process-wide settings, read once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub provider: ProviderSettings,
    pub agent: AgentSettings,
    pub persona: Option<PersonaSettings>,
    pub pushover: Option<PushoverConfig>,
    pub email: Option<EmailSettings>,
    pub sales: SalesSettings,
    pub server: ServerSettings,
}

impl Settings {
    /// Load `.env` if present, then read settings from `LIAISON_*` environment variables
    pub fn new() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenv::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env");
        }
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            .add_source(
                Environment::with_prefix("LIAISON")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        // Sections are read one by one so a missing field can be named with its section
        Ok(Settings {
            provider: section(&config, "provider")?.ok_or_else(|| {
                ConfigError::MissingEnvVar {
                    env_var: to_env_var("provider.type"),
                }
            })?,
            agent: section(&config, "agent")?.unwrap_or_default(),
            persona: section(&config, "persona")?,
            pushover: section(&config, "pushover")?,
            email: section(&config, "email")?,
            sales: section(&config, "sales")?.unwrap_or_default(),
            server: section(&config, "server")?.unwrap_or_default(),
        })
    }

    /// Settings section a flow cannot run without
    pub fn require<'a, T>(section: &'a Option<T>, name: &str) -> Result<&'a T, ConfigError> {
        section.as_ref().ok_or_else(|| ConfigError::MissingEnvVar {
            env_var: format!("{}__*", to_env_var(name)),
        })
    }
}

/// Deserialize one top-level section, `None` when no variable sets any of its keys
fn section<T: DeserializeOwned>(config: &Config, name: &str) -> Result<Option<T>, ConfigError> {
    match config.get::<T>(name) {
        Ok(value) => Ok(Some(value)),
        Err(config::ConfigError::NotFound(_)) => Ok(None),
        Err(err) => {
            tracing::debug!(section = name, "Configuration error: {:?}", &err);

            let error_str = err.to_string();
            match error_str.strip_prefix("missing field `") {
                Some(rest) => {
                    let field = rest.split('`').next().unwrap_or_default();
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(&format!("{}.{}", name, field)),
                    })
                }
                None => Err(ConfigError::Other(err)),
            }
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7860
}

fn default_openai_base_url() -> String {
    OPENAI_BASE_URL.to_string()
}

fn default_gemini_base_url() -> String {
    GEMINI_BASE_URL.to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_max_tool_iterations() -> usize {
    DEFAULT_MAX_TOOL_ITERATIONS
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_summary_path() -> PathBuf {
    PathBuf::from("docs/summary.txt")
}

fn default_profile_path() -> PathBuf {
    PathBuf::from("docs/profile.txt")
}

fn default_subject() -> String {
    "Sales email".to_string()
}

fn default_sendgrid_url() -> String {
    SENDGRID_URL.to_string()
}

fn default_sales_prompt() -> String {
    "Write a cold sales email".to_string()
}
