//! Ticket Triage Service
//!
//! Classifies incoming support tickets, routes them to a department, drafts
//! an acknowledgement with a generative model and stores the result.
//!
//! # Overview
//!
//! - Keyword override plus a fine-tuned sequence classifier served over HTTP
//! - Fixed queue-to-department routing table with a sales fallback
//! - Tone-aware reply prompts sent to Gemini, OpenAI or Anthropic
//! - SQLite persistence for users and tickets
//! - A warp REST API with health, readiness and metrics endpoints
//!
//! # Quick Start
//!
//! ```rust
//! use ticket_triage::classifier::keyword_override;
//! use ticket_triage::routing::{department_for, Department};
//!
//! // Purchase intent with no problem report skips the model entirely
//! assert_eq!(
//!     keyword_override("Can I get a quote for 10 seats?"),
//!     Some("Sales and Pre-Sales")
//! );
//! assert_eq!(keyword_override("The export is broken"), None);
//!
//! assert_eq!(department_for("IT Support"), Department::TechnicalSupport);
//! assert_eq!(department_for("Human Resources"), Department::Sales);
//! ```

pub mod api;
pub mod app;
pub mod auth;
pub mod classifier;
pub mod config;
pub mod error;
pub mod health;
pub mod llm;
pub mod observability;
pub mod pipeline;
pub mod reply;
pub mod routing;
pub mod store;
pub mod testing;
pub mod ticket_number;

pub use api::{ApiServer, AppState};
pub use config::TriageConfig;
pub use error::{TriageError, TriageResult};
pub use pipeline::{TicketRequest, TicketResponse, TriagePipeline};
pub use routing::Department;
pub use store::Store;
