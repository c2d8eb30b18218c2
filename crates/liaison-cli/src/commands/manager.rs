use anyhow::Result;
use std::sync::Arc;

use super::sales::email_system;
use crate::prompt::cliclack::CliclackPrompt;
use crate::session::Session;
use liaison::config::Settings;
use liaison::presets::{sales_manager, MANAGER_PROMPT};
use liaison::providers::base::Provider;

/// Let the sales manager agent call the writers as tools and send the winner itself
pub async fn handle_manager(
    settings: &Settings,
    provider: Arc<dyn Provider>,
    prompt: Option<String>,
) -> Result<()> {
    let email = email_system(settings)?;
    let manager = sales_manager(
        provider,
        settings.provider.model(),
        settings.agent.limits(),
        email,
    )?;

    let prompt = prompt.unwrap_or_else(|| MANAGER_PROMPT.to_string());
    let mut session = Session::new(manager, Box::new(CliclackPrompt::new()));
    session.headless_start(&prompt).await
}
