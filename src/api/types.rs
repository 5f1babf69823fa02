//! Request and response bodies for the HTTP API

use crate::store::{SeedReport, Ticket};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use crate::auth::{LoginRequest, LoginResponse};
pub use crate::pipeline::{TicketRequest, TicketResponse};

pub const WELCOME_MESSAGE: &str = "Welcome to Ticket Auto-Classification System API";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketListItem {
    pub id: i64,
    pub ticket_number: String,
    pub client_name: String,
    pub body: String,
    pub predicted_queue: Option<String>,
    pub assigned_department: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Ticket> for TicketListItem {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: ticket.id,
            ticket_number: ticket.ticket_number,
            client_name: ticket.client_name,
            body: ticket.body,
            predicted_queue: ticket.predicted_queue,
            assigned_department: ticket.assigned_department,
            status: ticket.status.as_str().to_string(),
            created_at: ticket.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitUsersResponse {
    pub message: String,
    pub created: Vec<String>,
}

impl From<SeedReport> for InitUsersResponse {
    fn from(report: SeedReport) -> Self {
        Self {
            message: "Users initialized".to_string(),
            created: report.created,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub timestamp: u64,
}

#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub alive: bool,
    pub timestamp: u64,
}
