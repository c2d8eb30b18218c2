use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::agent::{Agent, AgentConfig};
use crate::config::PersonaSettings;
use crate::errors::ConfigError;
use crate::prompt_template::{load_prompt, load_prompt_file, REPRESENTATIVE_TEMPLATE};
use crate::providers::base::Provider;
use crate::systems::ToolRegistry;

/// The person the representative speaks for, with the documents it answers from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Persona {
    pub name: String,
    pub summary: String,
    pub profile: String,
    #[serde(skip)]
    template: Option<PathBuf>,
}

impl Persona {
    pub fn new<N, S, P>(name: N, summary: S, profile: P) -> Self
    where
        N: Into<String>,
        S: Into<String>,
        P: Into<String>,
    {
        Self {
            name: name.into(),
            summary: summary.into(),
            profile: profile.into(),
            template: None,
        }
    }

    /// Read the summary and profile documents. Either one missing is fatal.
    pub fn load<N: Into<String>>(
        name: N,
        summary_path: impl AsRef<Path>,
        profile_path: impl AsRef<Path>,
    ) -> Result<Self, ConfigError> {
        let summary = read_document(summary_path.as_ref())?;
        let profile = read_document(profile_path.as_ref())?;
        tracing::debug!(
            summary_bytes = summary.len(),
            profile_bytes = profile.len(),
            "Loaded persona documents"
        );
        Ok(Self::new(name, summary, profile))
    }

    pub fn from_settings(settings: &PersonaSettings) -> Result<Self, ConfigError> {
        let persona = Self::load(
            settings.name.clone(),
            &settings.summary_path,
            &settings.profile_path,
        )?;
        Ok(match &settings.template_path {
            Some(path) => persona.with_template(path.clone()),
            None => persona,
        })
    }

    /// Render the system prompt from a template file instead of the built-in one
    pub fn with_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.template = Some(path.into());
        self
    }

    pub fn system_prompt(&self) -> Result<String, ConfigError> {
        let rendered = match &self.template {
            Some(path) => load_prompt_file(path.clone(), self)?,
            None => load_prompt(REPRESENTATIVE_TEMPLATE, self)?,
        };
        Ok(rendered)
    }

    /// Build the representative agent that answers as this persona
    pub fn representative(
        &self,
        provider: Arc<dyn Provider>,
        model: &str,
        registry: ToolRegistry,
    ) -> Result<Agent, ConfigError> {
        let config = AgentConfig::new(self.name.clone(), self.system_prompt()?, model);
        Ok(Agent::new(config, provider).with_registry(registry))
    }
}

/// Read a document as text. `.pdf` files (such as an exported profile) have their text extracted.
fn read_document(path: &Path) -> Result<String, ConfigError> {
    let document_error = |source: io::Error| ConfigError::Document {
        path: path.display().to_string(),
        source,
    };

    let is_pdf = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        return fs::read_to_string(path).map_err(document_error);
    }

    let bytes = fs::read(path).map_err(document_error)?;
    pdf_extract::extract_text_from_mem(&bytes)
        .map_err(|e| document_error(io::Error::new(io::ErrorKind::InvalidData, e.to_string())))
}
