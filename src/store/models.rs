//! Row types for the `users` and `tickets` tables

use crate::routing::Department;
use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Client,
    TechnicalSupport,
    Accounting,
    Sales,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Client => "client",
            UserRole::TechnicalSupport => "technical_support",
            UserRole::Accounting => "accounting",
            UserRole::Sales => "sales",
        }
    }

    /// Department staffed by this role, if any
    pub fn department(&self) -> Option<Department> {
        match self {
            UserRole::TechnicalSupport => Some(Department::TechnicalSupport),
            UserRole::Accounting => Some(Department::Accounting),
            UserRole::Sales => Some(Department::Sales),
            UserRole::Admin | UserRole::Client => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "client" => Ok(UserRole::Client),
            "technical_support" => Ok(UserRole::TechnicalSupport),
            "accounting" => Ok(UserRole::Accounting),
            "sales" => Ok(UserRole::Sales),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Pending,
    InProgress,
    Resolved,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "pending",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Resolved => "resolved",
        }
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TicketStatus::Pending),
            "in_progress" => Ok(TicketStatus::InProgress),
            "resolved" => Ok(TicketStatus::Resolved),
            other => Err(format!("unknown ticket status '{other}'")),
        }
    }
}

macro_rules! text_enum_sql {
    ($ty:ty) => {
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: String| FromSqlError::Other(e.into()))
            }
        }
    };
}

text_enum_sql!(UserRole);
text_enum_sql!(TicketStatus);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub full_name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ticket {
    pub id: i64,
    pub ticket_number: String,
    pub client_id: i64,
    pub client_name: String,
    pub body: String,
    pub predicted_queue: Option<String>,
    pub generated_reply: Option<String>,
    pub status: TicketStatus,
    pub assigned_department: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when inserting a ticket; id and timestamps are assigned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub ticket_number: String,
    pub client_id: i64,
    pub client_name: String,
    pub body: String,
    pub predicted_queue: String,
    pub generated_reply: String,
    pub assigned_department: Department,
    pub status: TicketStatus,
}

/// Which tickets a caller may see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketScope {
    All,
    Client(i64),
    Department(Department),
}

impl TicketScope {
    /// Resolve `(role, user_id)` from the list endpoint. `None` for roles
    /// that have no ticket view.
    pub fn for_role(role: &str, user_id: i64) -> Option<Self> {
        match role.parse::<UserRole>().ok()? {
            UserRole::Admin => Some(TicketScope::All),
            UserRole::Client => Some(TicketScope::Client(user_id)),
            staff => staff.department().map(TicketScope::Department),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [
            UserRole::Admin,
            UserRole::Client,
            UserRole::TechnicalSupport,
            UserRole::Accounting,
            UserRole::Sales,
        ] {
            assert_eq!(role.as_str().parse::<UserRole>(), Ok(role));
            assert_eq!(
                serde_json::to_string(&role).unwrap(),
                format!("\"{}\"", role.as_str())
            );
        }
    }

    #[test]
    fn test_status_default_is_pending() {
        assert_eq!(TicketStatus::default(), TicketStatus::Pending);
        assert_eq!(
            serde_json::to_string(&TicketStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
    }

    #[test]
    fn test_scope_for_role() {
        assert_eq!(TicketScope::for_role("admin", 1), Some(TicketScope::All));
        assert_eq!(
            TicketScope::for_role("client", 7),
            Some(TicketScope::Client(7))
        );
        assert_eq!(
            TicketScope::for_role("accounting", 7),
            Some(TicketScope::Department(Department::Accounting))
        );
        assert_eq!(TicketScope::for_role("manager", 7), None);
        assert_eq!(TicketScope::for_role("Admin", 7), None);
    }

    #[test]
    fn test_user_password_not_serialized() {
        let user = User {
            id: 1,
            username: "admin".to_string(),
            password: "admin123".to_string(),
            full_name: "System Administrator".to_string(),
            role: UserRole::Admin,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("admin123"));
    }
}
