//! Testing utilities and mock implementations
//!
//! Mocks for the classifier and LLM seams so the triage pipeline can be
//! exercised without the inference endpoint or a hosted model.

pub mod mocks;

pub use mocks::*;
