//! Acknowledgement reply drafting

pub mod generator;
pub mod prompt;

pub use generator::{ReplyError, ReplyGenerator, ReplySettings};
pub use prompt::{build_prompt, subject_line, BotPersona, PromptContext, ToneProfile};
