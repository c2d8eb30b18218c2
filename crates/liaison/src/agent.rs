use futures::stream::BoxStream;
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::{AgentError, AgentResult};
use crate::models::message::{Message, ToolRequest};
use crate::models::tool::Tool;
use crate::providers::base::{Completion, Provider};
use crate::systems::ToolRegistry;

pub const DEFAULT_MAX_TOOL_ITERATIONS: usize = 10;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Static description of one agent: who it is, what it is told, which model runs it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub name: String,
    pub instructions: String,
    pub model: String,
}

impl AgentConfig {
    pub fn new<N, I, M>(name: N, instructions: I, model: M) -> Self
    where
        N: Into<String>,
        I: Into<String>,
        M: Into<String>,
    {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            model: model.into(),
        }
    }
}

/// Bounds applied to every turn an agent runs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentLimits {
    /// Tool rounds allowed before the turn is abandoned
    pub max_tool_iterations: usize,
    /// Upper bound on a single model call
    pub request_timeout: Duration,
}

impl Default for AgentLimits {
    fn default() -> Self {
        Self {
            max_tool_iterations: DEFAULT_MAX_TOOL_ITERATIONS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// The final text of one agent run, tagged with the agent that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentOutput {
    pub agent: String,
    pub output: String,
}

/// Agent drives a model through tool calls until it answers in plain text
pub struct Agent {
    config: AgentConfig,
    provider: Arc<dyn Provider>,
    registry: ToolRegistry,
    limits: AgentLimits,
}

impl Agent {
    pub fn new(config: AgentConfig, provider: Arc<dyn Provider>) -> Self {
        Self {
            config,
            provider,
            registry: ToolRegistry::new(),
            limits: AgentLimits::default(),
        }
    }

    pub fn with_registry(mut self, registry: ToolRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_limits(mut self, limits: AgentLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Build the sequence for a new user turn: instructions, prior exchange, then the user text
    pub fn conversation(&self, history: &[Message], user_text: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system().with_text(&self.config.instructions));
        messages.extend_from_slice(history);
        messages.push(Message::user().with_text(user_text));
        messages
    }

    async fn invoke(&self, messages: &[Message], tools: &[Tool]) -> AgentResult<Completion> {
        let call = self
            .provider
            .complete(&self.config.model, messages, tools);
        match tokio::time::timeout(self.limits.request_timeout, call).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(AgentError::Timeout(self.limits.request_timeout)),
        }
    }

    /// Create a stream that yields each message as the agent appends it to the conversation.
    /// This includes assistant tool requests, one tool message per request, and the final
    /// assistant answer, which is always the last item.
    pub fn reply(&self, messages: &[Message]) -> BoxStream<'_, AgentResult<Message>> {
        let mut messages = messages.to_vec();
        let tools = self.registry.tools();
        let max_rounds = self.limits.max_tool_iterations;

        Box::pin(async_stream::try_stream! {
            let mut rounds = 0;
            loop {
                let completion = self.invoke(&messages, &tools).await?;
                tracing::debug!(
                    agent = %self.config.name,
                    finish_reason = ?completion.finish_reason,
                    usage = ?completion.usage,
                    "Model responded"
                );

                let more = completion.requests_tools();
                let response = completion.message;
                let requests: Vec<ToolRequest> =
                    response.tool_requests().into_iter().cloned().collect();

                messages.push(response.clone());
                yield response;

                if !more {
                    break;
                }

                rounds += 1;
                if rounds > max_rounds {
                    Err::<(), _>(AgentError::ToolLoopExceeded(max_rounds))?;
                }

                // Sequential so handler side effects happen in the order the model asked
                for request in &requests {
                    let output = self.registry.dispatch(request).await?;
                    let message = Message::tool().with_tool_response(request.id.clone(), output);
                    messages.push(message.clone());
                    yield message;
                }
            }
        })
    }

    /// Drive a reply to completion and return the text of the final answer
    pub async fn complete(&self, messages: &[Message]) -> AgentResult<String> {
        let mut stream = self.reply(messages);
        let mut last = None;
        while let Some(message) = stream.try_next().await? {
            last = Some(message);
        }
        last.map(|m| m.text())
            .ok_or_else(|| AgentError::Internal("reply produced no messages".to_string()))
    }

    /// Answer one user message given the prior exchange
    pub async fn respond(&self, history: &[Message], user_text: &str) -> AgentResult<String> {
        self.complete(&self.conversation(history, user_text)).await
    }

    /// Run the agent on a single task prompt with no prior exchange
    pub async fn run(&self, input: &str) -> AgentResult<AgentOutput> {
        let output = self.respond(&[], input).await?;
        Ok(AgentOutput {
            agent: self.config.name.clone(),
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::MessageContent;
    use crate::models::role::Role;
    use crate::models::tool::ToolCall;
    use crate::providers::mock::MockProvider;
    use crate::systems::System;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct EchoSystem {
        tools: Vec<Tool>,
    }

    impl EchoSystem {
        fn new() -> Self {
            Self {
                tools: vec![Tool::builder("echo", "Echoes back the input")
                    .param("message", "string", "What to echo", true)
                    .build()],
            }
        }
    }

    #[async_trait]
    impl System for EchoSystem {
        fn name(&self) -> &str {
            "test"
        }

        fn description(&self) -> &str {
            "A mock system for testing"
        }

        fn tools(&self) -> &[Tool] {
            &self.tools
        }

        async fn call(&self, tool_call: ToolCall) -> AgentResult<Value> {
            let message = tool_call.str_arg("message").ok_or_else(|| {
                AgentError::InvalidParameters("message parameter required".into())
            })?;
            Ok(json!({"echo": message}))
        }
    }

    fn agent(provider: &MockProvider) -> Agent {
        let registry = ToolRegistry::new().with_system(EchoSystem::new()).unwrap();
        Agent::new(
            AgentConfig::new("tester", "You are a test agent", "gpt-4o-mini"),
            Arc::new(provider.clone()),
        )
        .with_registry(registry)
    }

    fn echo_request(id: &str, message: &str) -> Message {
        Message::assistant().with_tool_request(
            id,
            Ok(ToolCall::new("echo", json!({"message": message}))),
        )
    }

    async fn collect(agent: &Agent, messages: &[Message]) -> AgentResult<Vec<Message>> {
        agent.reply(messages).try_collect().await
    }

    #[tokio::test]
    async fn test_simple_response() {
        let response = Message::assistant().with_text("Hello!");
        let provider = MockProvider::new(vec![response.clone()]);
        let agent = agent(&provider);

        let initial = agent.conversation(&[], "Hi");
        let messages = collect(&agent, &initial).await.unwrap();

        assert_eq!(messages, vec![response]);
        assert_eq!(provider.calls().len(), 1);
        assert_eq!(provider.calls()[0], initial);
    }

    #[tokio::test]
    async fn test_tool_round_appends_one_message_per_request() {
        let provider = MockProvider::new(vec![
            Message::assistant()
                .with_tool_request("1", Ok(ToolCall::new("echo", json!({"message": "first"}))))
                .with_tool_request("2", Ok(ToolCall::new("echo", json!({"message": "second"})))),
            Message::assistant().with_text("All done!"),
        ]);
        let agent = agent(&provider);

        let initial = agent.conversation(&[], "Multiple calls");
        let messages = collect(&agent, &initial).await.unwrap();

        // tool requests, two tool results, final text
        assert_eq!(messages.len(), 4);
        assert!(messages[0].has_tool_requests());
        assert_eq!(messages[1].role, Role::Tool);
        assert_eq!(
            messages[1].content[0],
            MessageContent::tool_response("1", json!({"echo": "first"}))
        );
        assert_eq!(
            messages[2].content[0],
            MessageContent::tool_response("2", json!({"echo": "second"}))
        );
        assert_eq!(messages[3].text(), "All done!");

        let calls = provider.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].len(), calls[0].len() + 3);
        assert_eq!(calls[1][..calls[0].len()], calls[0][..]);
        assert_eq!(calls[1][calls[0].len()..], messages[..3]);
    }

    #[tokio::test]
    async fn test_complete_returns_final_text() {
        let provider = MockProvider::new(vec![
            echo_request("1", "test"),
            Message::assistant().with_text("Done!"),
        ]);
        let agent = agent(&provider);

        let answer = agent.respond(&[], "Echo test").await.unwrap();
        assert_eq!(answer, "Done!");
    }

    #[tokio::test]
    async fn test_namespaced_tool_name_gets_empty_result() {
        use crate::providers::configs::OpenAiProviderConfig;
        use crate::providers::openai::OpenAiProvider;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "function",
                            "function": {"name": "default_api.lookup", "arguments": "{}"}
                        }]
                    },
                    "finish_reason": "tool_calls"
                }]
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "fine"},
                    "finish_reason": "stop"
                }]
            })))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new(OpenAiProviderConfig::new(
            format!("{}/v1", server.uri()),
            "test_api_key",
        ))
        .unwrap();
        let registry = ToolRegistry::new().with_system(EchoSystem::new()).unwrap();
        let agent = Agent::new(
            AgentConfig::new("tester", "You are a test agent", "gemini-2.0-flash"),
            Arc::new(provider),
        )
        .with_registry(registry);

        let answer = agent.respond(&[], "Look something up").await.unwrap();
        assert_eq!(answer, "fine");
    }

    #[tokio::test]
    async fn test_unknown_tool_gets_empty_result() {
        let provider = MockProvider::new(vec![
            Message::assistant()
                .with_tool_request("1", Ok(ToolCall::new("invalid_tool", json!({})))),
            Message::assistant().with_text("Carrying on"),
        ]);
        let agent = agent(&provider);

        let messages = collect(&agent, &agent.conversation(&[], "Invalid tool"))
            .await
            .unwrap();

        assert_eq!(messages.len(), 3);
        assert_eq!(
            messages[1].content[0],
            MessageContent::tool_response("1", json!({}))
        );
        assert_eq!(messages[2].text(), "Carrying on");
    }

    #[tokio::test]
    async fn test_handler_error_ends_turn() {
        let provider = MockProvider::new(vec![
            Message::assistant().with_tool_request("1", Ok(ToolCall::new("echo", json!({})))),
            Message::assistant().with_text("unreachable"),
        ]);
        let agent = agent(&provider);

        let err = agent.respond(&[], "Break it").await.unwrap_err();
        assert!(matches!(err, AgentError::InvalidParameters(_)));
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_tool_loop_cap() {
        let provider = MockProvider::new((0..5).map(|i| echo_request(&i.to_string(), "again")).collect());
        let agent = agent(&provider).with_limits(AgentLimits {
            max_tool_iterations: 2,
            ..Default::default()
        });

        let err = agent.respond(&[], "Loop forever").await.unwrap_err();
        assert_eq!(err, AgentError::ToolLoopExceeded(2));
        assert_eq!(provider.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let provider = MockProvider::new(vec![Message::assistant().with_text("too late")])
            .with_delay(Duration::from_secs(5));
        let timeout = Duration::from_millis(20);
        let agent = agent(&provider).with_limits(AgentLimits {
            request_timeout: timeout,
            ..Default::default()
        });

        let err = agent.respond(&[], "Hello?").await.unwrap_err();
        assert_eq!(err, AgentError::Timeout(timeout));
    }

    #[tokio::test]
    async fn test_provider_error_ends_turn() {
        let provider = MockProvider::failing("Server error: 503");
        let agent = agent(&provider);

        let err = agent.respond(&[], "Hi").await.unwrap_err();
        match err {
            AgentError::Provider(message) => assert!(message.contains("503")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_tags_output_with_agent_name() {
        let provider = MockProvider::new(vec![Message::assistant().with_text("Dear CEO")]);
        let agent = agent(&provider);

        let output = agent.run("Write a cold email").await.unwrap();
        assert_eq!(
            output,
            AgentOutput {
                agent: "tester".to_string(),
                output: "Dear CEO".to_string()
            }
        );
    }

    #[test]
    fn test_conversation_layout() {
        let agent = agent(&MockProvider::default());
        let history = vec![
            Message::user().with_text("Earlier question"),
            Message::assistant().with_text("Earlier answer"),
        ];

        let messages = agent.conversation(&history, "New question");
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].text(), "You are a test agent");
        assert_eq!(messages[1..3], history[..]);
        assert_eq!(messages[3].role, Role::User);
        assert_eq!(messages[3].text(), "New question");
    }
}
