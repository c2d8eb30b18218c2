//! Built-in agents for the sales email flows.

use std::sync::Arc;

use crate::agent::{Agent, AgentConfig, AgentLimits};
use crate::errors::AgentResult;
use crate::providers::base::Provider;
use crate::selector::{FailurePolicy, Selector};
use crate::systems::{AgentTool, EmailSystem, ToolRegistry};

pub const SALES_TOOL_DESCRIPTION: &str = "Write a cold sales email";

pub const PROFESSIONAL_INSTRUCTIONS: &str = "You are a sales agent working for ComplAI, \
a company that provides a SaaS tool for ensuring SOC2 compliance and preparing for audits, powered by AI. \
You write professional, serious cold emails.";

pub const ENGAGING_INSTRUCTIONS: &str = "You are a humorous, engaging sales agent working for ComplAI, \
a company that provides a SaaS tool for ensuring SOC2 compliance and preparing for audits, powered by AI. \
You write witty, engaging cold emails that are likely to get a response.";

pub const BUSY_INSTRUCTIONS: &str = "You are a busy sales agent working for ComplAI, \
a company that provides a SaaS tool for ensuring SOC2 compliance and preparing for audits, powered by AI. \
You write concise, to the point cold emails.";

pub const PICKER_INSTRUCTIONS: &str = "You pick the best cold sales email from the given options. \
Imagine you are a customer and pick the one you are most likely to respond to. \
Do not give an explanation; reply with the selected email only.";

pub const MANAGER_INSTRUCTIONS: &str = "You are a sales manager working for ComplAI. \
You use the tools given to you to generate cold sales emails. \
You never generate sales emails yourself; you always use the tools. \
You try all 3 sales_agent tools once before choosing the best one. \
You pick the single best email and use the send_email tool to send the best email \
(and only the best email) to the user.";

pub const MANAGER_PROMPT: &str = "Send a cold sales email addressed to 'Dear CEO'";

/// The three sales writers, each with its own tone
pub fn sales_agent_configs(model: &str) -> Vec<AgentConfig> {
    vec![
        AgentConfig::new("Professional Sales Agent", PROFESSIONAL_INSTRUCTIONS, model),
        AgentConfig::new("Engaging Sales Agent", ENGAGING_INSTRUCTIONS, model),
        AgentConfig::new("Busy Sales Agent", BUSY_INSTRUCTIONS, model),
    ]
}

fn sales_agents(provider: &Arc<dyn Provider>, model: &str, limits: AgentLimits) -> Vec<Arc<Agent>> {
    sales_agent_configs(model)
        .into_iter()
        .map(|config| Arc::new(Agent::new(config, provider.clone()).with_limits(limits)))
        .collect()
}

/// Selector over the sales writers, with the picker agent when `pick` is set
pub fn sales_selector(
    provider: Arc<dyn Provider>,
    model: &str,
    limits: AgentLimits,
    policy: FailurePolicy,
    pick: bool,
) -> Selector {
    let selector = Selector::new(sales_agents(&provider, model, limits)).with_policy(policy);
    if pick {
        let picker = AgentConfig::new("sales_picker", PICKER_INSTRUCTIONS, model);
        selector.with_picker(Arc::new(Agent::new(picker, provider).with_limits(limits)))
    } else {
        selector
    }
}

/// Manager agent that calls each sales writer as a tool and sends the winner
pub fn sales_manager(
    provider: Arc<dyn Provider>,
    model: &str,
    limits: AgentLimits,
    email: EmailSystem,
) -> AgentResult<Agent> {
    let mut registry = ToolRegistry::new();
    for (i, agent) in sales_agents(&provider, model, limits).into_iter().enumerate() {
        let name = format!("sales_agent{}", i + 1);
        registry.add_system(Arc::new(AgentTool::new(name, SALES_TOOL_DESCRIPTION, agent)))?;
    }
    registry.add_system(Arc::new(email))?;

    let config = AgentConfig::new("Sales Manager", MANAGER_INSTRUCTIONS, model);
    Ok(Agent::new(config, provider)
        .with_registry(registry)
        .with_limits(limits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::{Email, EmailSender, Envelope};
    use crate::models::message::Message;
    use crate::models::role::Role;
    use crate::models::tool::ToolCall;
    use crate::providers::mock::MockProvider;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct OutboxSender {
        sent: Mutex<Vec<Email>>,
    }

    #[async_trait]
    impl EmailSender for OutboxSender {
        async fn send(&self, email: &Email) -> anyhow::Result<u16> {
            self.sent.lock().unwrap().push(email.clone());
            Ok(202)
        }
    }

    fn email_system(outbox: Arc<OutboxSender>) -> EmailSystem {
        EmailSystem::new(
            outbox,
            Envelope {
                from: "sales@example.com".to_string(),
                to: "ceo@example.com".to_string(),
                subject: "Sales email".to_string(),
            },
        )
    }

    #[test]
    fn test_sales_agent_configs() {
        let configs = sales_agent_configs("gpt-4o-mini");
        let names: Vec<&str> = configs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Professional Sales Agent", "Engaging Sales Agent", "Busy Sales Agent"]
        );
        assert!(configs.iter().all(|c| c.model == "gpt-4o-mini"));
    }

    #[tokio::test]
    async fn test_sales_selector_without_picker() {
        // Agents share one provider, so each takes the next scripted reply
        let provider = MockProvider::new(vec![
            Message::assistant().with_text("one"),
            Message::assistant().with_text("two"),
            Message::assistant().with_text("three"),
        ]);
        let selector = sales_selector(
            Arc::new(provider.clone()),
            "gpt-4o-mini",
            AgentLimits::default(),
            FailurePolicy::Abort,
            false,
        );

        let outputs = selector.run_all("Write a cold sales email").await.unwrap();
        assert_eq!(outputs.len(), 3);
        assert_eq!(provider.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_sales_manager_delegates_and_sends() {
        // Manager and writers share the scripted provider; calls happen strictly in sequence
        let provider = MockProvider::new(vec![
            Message::assistant().with_tool_request(
                "1",
                Ok(ToolCall::new("sales_agent1", json!({"input": "Write to the CEO"}))),
            ),
            Message::assistant().with_text("Dear CEO, a serious offer"),
            Message::assistant().with_tool_request(
                "2",
                Ok(ToolCall::new("send_email", json!({"body": "Dear CEO, a serious offer"}))),
            ),
            Message::assistant().with_text("Sent the professional email"),
        ]);
        let outbox = Arc::new(OutboxSender::default());
        let manager = sales_manager(
            Arc::new(provider.clone()),
            "gpt-4o-mini",
            AgentLimits::default(),
            email_system(outbox.clone()),
        )
        .unwrap();

        let answer = manager.respond(&[], MANAGER_PROMPT).await.unwrap();
        assert_eq!(answer, "Sent the professional email");

        let sent = outbox.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].body, "Dear CEO, a serious offer");

        let calls = provider.calls();
        assert_eq!(calls.len(), 4);
        // The delegated writer ran with its own instructions, not the manager's
        assert_eq!(calls[1][0].role, Role::System);
        assert_eq!(calls[1][0].text(), PROFESSIONAL_INSTRUCTIONS);
        let delegated = calls[2].last().unwrap();
        assert_eq!(
            delegated.content[0].as_tool_response().unwrap().output,
            json!({"output": "Dear CEO, a serious offer"})
        );
    }
}
