use super::{base::Provider, configs::ProviderConfig, openai::OpenAiProvider};
use anyhow::Result;
use serde::Deserialize;
use std::sync::Arc;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(EnumIter, EnumString, Display, Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    OpenAi,
    Gemini,
}

pub fn get_provider(config: ProviderConfig) -> Result<Arc<dyn Provider>> {
    match config {
        ProviderConfig::OpenAi(openai_config) | ProviderConfig::Gemini(openai_config) => {
            Ok(Arc::new(OpenAiProvider::new(openai_config)?))
        }
    }
}
