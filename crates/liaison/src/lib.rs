pub mod agent;
pub mod config;
pub mod errors;
pub mod mail;
pub mod models;
pub mod notify;
pub mod persona;
pub mod presets;
pub mod prompt_template;
pub mod providers;
pub mod selector;
pub mod systems;
