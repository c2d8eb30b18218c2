use std::time::Duration;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

// Unified enum to wrap different provider configurations
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    OpenAi(OpenAiProviderConfig),
    Gemini(OpenAiProviderConfig),
}

/// Settings for any endpoint that speaks the openai chat completions protocol
#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    /// Base url up to and including the api version, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    pub api_key: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
    pub timeout: Duration,
}

impl OpenAiProviderConfig {
    pub fn new<U: Into<String>, K: Into<String>>(base_url: U, api_key: K) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            temperature: None,
            max_tokens: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn openai<K: Into<String>>(api_key: K) -> Self {
        Self::new(OPENAI_BASE_URL, api_key)
    }

    pub fn gemini<K: Into<String>>(api_key: K) -> Self {
        Self::new(GEMINI_BASE_URL, api_key)
    }

    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}
