//! agentloop — a tool-calling agent loop
//!
//! Drives an OpenAI-compatible chat-completions endpoint through repeated
//! think/act iterations: the model either requests tool calls, which are
//! executed and fed back, or finishes with an answer. Runs either one-shot
//! ([`Agent::run`](agent::Agent::run)) or as a long-lived interactive
//! [`Session`](agent::Session) that streams events and accepts human input
//! for tools that ask for it.
//!
//! # Quick Start
//!
//! ```no_run
//! use agentloop::prelude::*;
//!
//! # async fn example() -> agentloop::error::Result<()> {
//! let mut agent = Agent::new(AgentConfig::from_env()?)?;
//! agent.register_tool(FnTool::new(
//!     ToolDefinition::new("echo", "Echo the text back").string("text", "Text to echo", true),
//!     |args, _ctx| async move { Ok(serde_json::json!(args.get_str("text")?)) },
//! ));
//! let result = agent.run("Say hello through the echo tool").await?;
//! println!("{}", result.content);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod agent_loop;
pub mod config;
pub mod error;
pub mod prelude;
pub mod provider;
pub mod tools;
pub mod types;
