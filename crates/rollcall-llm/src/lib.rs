// Claude-backed group naming for the partition engine.

pub mod client;
pub mod naming;

pub use client::{ClaudeClient, Completion, LlmError};
pub use naming::LlmClient;
