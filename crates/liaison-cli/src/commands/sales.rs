use anyhow::{Context, Result};
use console::style;
use std::sync::Arc;

use crate::prompt::cliclack::print_markdown;
use liaison::config::Settings;
use liaison::mail::SendGridClient;
use liaison::presets::sales_selector;
use liaison::providers::base::Provider;
use liaison::systems::EmailSystem;

const THEME: &str = "zenburn";

pub fn email_system(settings: &Settings) -> Result<EmailSystem> {
    let email = Settings::require(&settings.email, "email")?;
    let client = SendGridClient::with_url(email.api_key.clone(), email.url.clone())
        .context("Failed to create SendGrid client")?;
    Ok(EmailSystem::new(Arc::new(client), email.envelope()))
}

/// Run the sales writers side by side, optionally narrowing to one email and sending it
pub async fn handle_sales(
    settings: &Settings,
    provider: Arc<dyn Provider>,
    pick: bool,
    send: bool,
    prompt: Option<String>,
) -> Result<()> {
    let prompt = prompt.unwrap_or_else(|| settings.sales.prompt.clone());
    let selector = sales_selector(
        provider,
        settings.provider.model(),
        settings.agent.limits(),
        settings.sales.failure_policy,
        pick,
    );

    let spin = cliclack::spinner();
    spin.start("writing emails");

    if send {
        let email = email_system(settings)?;
        let status = selector.deliver(&prompt, &email).await;
        spin.stop("");
        let status = status?;
        println!("{} {}", style("sent:").green().bold(), status);
    } else if pick {
        let best = selector.pick_best(&prompt).await;
        spin.stop("");
        println!("{}", style("Best sales email:").bold());
        print_markdown(&best?, THEME);
    } else {
        let outputs = selector.run_all(&prompt).await;
        spin.stop("");
        for output in outputs? {
            println!("{}", style(&output.agent).bold());
            print_markdown(&output.output, THEME);
            println!("\n");
        }
    }
    Ok(())
}
