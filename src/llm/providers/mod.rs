//! LLM provider implementations
//!
//! Concrete implementations of the LlmProvider trait for hosted model services.

pub mod anthropic;
pub mod gemini;
pub mod openai;

pub use anthropic::*;
pub use gemini::*;
pub use openai::*;
