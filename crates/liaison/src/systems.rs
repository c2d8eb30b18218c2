//! Systems own the tools an agent may call. Each system declares its tools and
//! executes calls addressed to them; the [`ToolRegistry`] routes a model's tool
//! requests to the system that registered the tool name.
mod agent_tool;
mod email;
mod lead_capture;
mod registry;
mod system;

pub use agent_tool::AgentTool;
pub use email::EmailSystem;
pub use lead_capture::LeadCaptureSystem;
pub use registry::ToolRegistry;
pub use system::System;
