//! These models represent the objects passed around by the agent
//!
//! There are two related formats we need to interact with:
//! - openai-compatible messages/tools, sent from the agent to the LLM
//! - tool requests and results, exchanged between the agent and its systems
//!
//! We always immediately convert the wire format into the internal structs using the
//! helpers in `providers::utils`, so the internal models are not an exact match to it.
pub mod message;
pub mod role;
pub mod tool;
