use anyhow::{Context, Result};
use std::sync::Arc;

use crate::prompt::cliclack::CliclackPrompt;
use crate::session::Session;
use liaison::config::Settings;
use liaison::notify::notifier_from;
use liaison::persona::Persona;
use liaison::providers::base::Provider;
use liaison::systems::{LeadCaptureSystem, ToolRegistry};

pub async fn handle_chat(settings: &Settings, provider: Arc<dyn Provider>) -> Result<()> {
    let persona = Persona::from_settings(Settings::require(&settings.persona, "persona")?)
        .context("Failed to load persona documents")?;

    let notifier = notifier_from(settings.pushover.clone())?;
    let registry = ToolRegistry::new().with_system(LeadCaptureSystem::new(notifier))?;
    let agent = persona
        .representative(provider, settings.provider.model(), registry)?
        .with_limits(settings.agent.limits());

    let mut session = Session::new(agent, Box::new(CliclackPrompt::new()));
    session.start().await
}
