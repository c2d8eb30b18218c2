use anyhow::{anyhow, Result};
use futures::StreamExt;

use crate::prompt::{InputType, Prompt};
use liaison::agent::Agent;
use liaison::models::message::Message;

/// An interactive conversation with one agent.
///
/// Only completed turns are kept in the history; a turn that fails or is interrupted
/// leaves it as it was before the question was asked.
pub struct Session<'a> {
    agent: Agent,
    prompt: Box<dyn Prompt + 'a>,
    history: Vec<Message>,
}

impl<'a> Session<'a> {
    pub fn new(agent: Agent, prompt: Box<dyn Prompt + 'a>) -> Self {
        Session {
            agent,
            prompt,
            history: Vec::new(),
        }
    }

    pub async fn start(&mut self) -> Result<()> {
        self.prompt.ready(self.agent.name());

        loop {
            let input = self.prompt.get_input()?;
            let text = match input.input_type {
                InputType::Message => match input.content {
                    Some(content) => content,
                    None => continue,
                },
                InputType::Exit => break,
                InputType::AskAgain => continue,
            };

            self.prompt.show_busy();
            let result = self.process_turn(&text).await;
            self.prompt.hide_busy();
            if let Err(e) = result {
                self.prompt.render_error(&e.to_string());
            }
        }

        self.prompt.close();
        Ok(())
    }

    /// Run a single turn without asking for input. A failed turn fails the run.
    pub async fn headless_start(&mut self, text: &str) -> Result<()> {
        self.prompt.show_busy();
        let result = self.process_turn(text).await;
        self.prompt.hide_busy();
        self.prompt.close();
        result
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    async fn process_turn(&mut self, text: &str) -> Result<()> {
        let messages = self.agent.conversation(&self.history, text);
        let mut turn = vec![Message::user().with_text(text)];
        let mut stream = self.agent.reply(&messages);

        loop {
            tokio::select! {
                response = stream.next() => {
                    match response {
                        Some(Ok(message)) => {
                            self.prompt.render(&message);
                            turn.push(message);
                        }
                        Some(Err(e)) => {
                            tracing::error!(error = %e, "Turn failed");
                            return Err(e.into());
                        }
                        None => break,
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    return Err(anyhow!("Interrupted, the last question was forgotten"));
                }
            }
        }

        self.history.extend(turn);
        Ok(())
    }
}
