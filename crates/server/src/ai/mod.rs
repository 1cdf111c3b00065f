//! AI features powered by Claude API

pub mod chat;
pub mod client;
pub mod query;
pub mod structured;
pub mod symptoms;

pub use client::{AiError, ClaudeClient};
pub use structured::ObjectEvent;
