//! LLM provider abstraction layer
//!
//! Provider-agnostic interface for the generative model that drafts
//! acknowledgement replies, with Gemini, OpenAI and Anthropic backends.

pub mod provider;
pub mod providers;

pub use provider::*;
pub use providers::*;
