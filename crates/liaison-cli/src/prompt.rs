use anyhow::Result;
use liaison::models::message::Message;

pub mod cliclack;

pub trait Prompt {
    fn render(&mut self, message: &Message);
    fn render_error(&mut self, error: &str);
    fn get_input(&mut self) -> Result<Input>;
    fn show_busy(&mut self);
    fn hide_busy(&mut self);
    fn close(&self);
    fn ready(&self, name: &str) {
        println!("\n");
        println!("You are chatting with {}'s representative. Ask anything about their work.", name);
        println!("\n");
    }
}

pub struct Input {
    pub input_type: InputType,
    pub content: Option<String>, // Optional content as sometimes the user may be issuing a command eg. (Exit)
}

pub enum InputType {
    AskAgain, // Ask the user for input again. Control flow command.
    Message,  // User sent a message
    Exit,     // User wants to exit the session
}

pub enum Theme {
    Light,
    Dark,
}
