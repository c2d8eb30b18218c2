use std::io::{self, Write};

use anyhow::Result;
use bat::WrappingMode;
use cliclack::{input, spinner, ProgressBar};
use console::style;
use liaison::models::message::{Message, MessageContent};
use liaison::models::role::Role;

use super::{Input, InputType, Prompt, Theme};

pub struct CliclackPrompt {
    spinner: Option<ProgressBar>,
    input_mode: InputMode,
    theme: Theme,
}

enum InputMode {
    Singleline,
    Multiline,
}

impl CliclackPrompt {
    pub fn new() -> Self {
        CliclackPrompt {
            spinner: None,
            input_mode: InputMode::Singleline,
            theme: Theme::Dark,
        }
    }

    fn theme_name(&self) -> &'static str {
        match self.theme {
            Theme::Light => "GitHub",
            Theme::Dark => "zenburn",
        }
    }
}

fn pretty_print(printer: &mut bat::PrettyPrinter) {
    if let Err(e) = printer.print() {
        eprintln!("Failed to render output: {}", e);
    }
}

fn print_tool_request(content: &str, theme: &str, tool_name: &str) {
    pretty_print(
        bat::PrettyPrinter::new()
            .input(
                bat::Input::from_bytes(content.as_bytes())
                    .name(format!("Tool Request: {}", tool_name)),
            )
            .theme(theme)
            .language("JSON")
            .grid(true)
            .header(true)
            .wrapping_mode(WrappingMode::Character),
    );
}

fn print_tool_response(content: &str, theme: &str) {
    pretty_print(
        bat::PrettyPrinter::new()
            .input(bat::Input::from_bytes(content.as_bytes()).name("Tool Response:"))
            .theme(theme)
            .language("JSON")
            .grid(true)
            .header(true)
            .wrapping_mode(WrappingMode::Character),
    );
}

pub fn print_markdown(content: &str, theme: &str) {
    pretty_print(
        bat::PrettyPrinter::new()
            .input(bat::Input::from_bytes(content.as_bytes()))
            .theme(theme)
            .language("Markdown")
            .wrapping_mode(WrappingMode::Character),
    );
}

impl Prompt for CliclackPrompt {
    fn render(&mut self, message: &Message) {
        self.hide_busy();
        let theme = self.theme_name();

        for message_content in &message.content {
            match message_content {
                MessageContent::Text(text) if message.role == Role::Assistant => {
                    print_markdown(&text.text, theme)
                }
                MessageContent::Text(_) => {}
                MessageContent::ToolRequest(tool_request) => match &tool_request.tool_call {
                    Ok(call) => {
                        let arguments = serde_json::to_string_pretty(&call.arguments)
                            .unwrap_or_else(|_| call.arguments.to_string());
                        print_tool_request(&arguments, theme, &call.name);
                    }
                    Err(e) => print_markdown(&e.to_string(), theme),
                },
                MessageContent::ToolResponse(tool_response) => {
                    let output = serde_json::to_string_pretty(&tool_response.output)
                        .unwrap_or_else(|_| tool_response.output.to_string());
                    print_tool_response(&output, theme);
                }
            }
        }

        println!();
        let _ = io::stdout().flush();
    }

    fn render_error(&mut self, error: &str) {
        self.hide_busy();
        println!("{} {}", style("error:").red().bold(), error);
    }

    fn show_busy(&mut self) {
        let spin = spinner();
        spin.start("awaiting reply");
        self.spinner = Some(spin);
    }

    fn hide_busy(&mut self) {
        if let Some(spin) = self.spinner.take() {
            spin.stop("");
        }
    }

    fn get_input(&mut self) -> Result<Input> {
        let mut input = input("You:").placeholder("");
        match self.input_mode {
            InputMode::Multiline => input = input.multiline(),
            InputMode::Singleline => (),
        }
        let message_text: String = input.interact()?;
        let message_text = message_text.trim();

        if message_text.eq_ignore_ascii_case("/exit") || message_text.eq_ignore_ascii_case("/quit")
        {
            Ok(Input {
                input_type: InputType::Exit,
                content: None,
            })
        } else if message_text.eq_ignore_ascii_case("/m") {
            self.input_mode = InputMode::Multiline;
            self.get_input()
        } else if message_text.eq_ignore_ascii_case("/s") {
            self.input_mode = InputMode::Singleline;
            self.get_input()
        } else if message_text.eq_ignore_ascii_case("/t") {
            self.theme = match self.theme {
                Theme::Light => {
                    println!("Switching to Dark theme");
                    Theme::Dark
                }
                Theme::Dark => {
                    println!("Switching to Light theme");
                    Theme::Light
                }
            };
            self.get_input()
        } else if message_text.eq_ignore_ascii_case("/?") {
            println!("Commands:");
            println!("/exit - Exit the session");
            println!("/m - Switch to multiline input mode");
            println!("/s - Switch to singleline input mode");
            println!("/t - Toggle Light/Dark theme");
            println!("/? - Display this help message");
            println!("Ctrl+C - Interrupt the reply (forgets the interrupted question)");
            self.get_input()
        } else if message_text.is_empty() {
            Ok(Input {
                input_type: InputType::AskAgain,
                content: None,
            })
        } else {
            Ok(Input {
                input_type: InputType::Message,
                content: Some(message_text.to_string()),
            })
        }
    }

    fn close(&self) {
        // No cleanup required
    }
}
