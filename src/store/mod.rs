//! SQLite-backed persistence for users and tickets
//!
//! A single connection is shared behind a mutex; every operation is one
//! short statement or transaction.

pub mod models;
pub mod seed;

pub use models::{
    NewTicket, NewUser, Ticket, TicketScope, TicketStatus, User, UserRole,
};
pub use seed::{default_users, SeedReport};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Failed to prepare database location: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database connection lock poisoned")]
    Poisoned,
    #[error("Database task failed: {0}")]
    Task(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    full_name TEXT NOT NULL,
    role TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_users_username ON users(username);

CREATE TABLE IF NOT EXISTS tickets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ticket_number TEXT NOT NULL UNIQUE,
    client_id INTEGER NOT NULL,
    client_name TEXT NOT NULL,
    body TEXT NOT NULL,
    predicted_queue TEXT,
    generated_reply TEXT,
    status TEXT NOT NULL DEFAULT 'pending',
    assigned_department TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_tickets_ticket_number ON tickets(ticket_number);
CREATE INDEX IF NOT EXISTS idx_tickets_predicted_queue ON tickets(predicted_queue);
CREATE INDEX IF NOT EXISTS idx_tickets_assigned_department ON tickets(assigned_department);
"#;

const TICKET_COLUMNS: &str = "id, ticket_number, client_id, client_name, body, predicted_queue, \
     generated_reply, status, assigned_department, created_at, updated_at";

#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Open or create the database at `path`; `":memory:"` opens a private
    /// in-memory database.
    pub fn open(path: &str) -> StoreResult<Self> {
        if path == ":memory:" {
            return Self::from_connection(Connection::open_in_memory()?);
        }

        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        info!("Opening ticket database at {}", path);
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::open(":memory:")
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Run `f` on the blocking pool; for use from async handlers
    pub async fn run<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Store) -> StoreResult<T> + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }

    pub fn ping(&self) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    pub fn insert_ticket(&self, ticket: &NewTicket) -> StoreResult<Ticket> {
        let conn = self.lock()?;
        let now = Utc::now();

        conn.execute(
            r#"
            INSERT INTO tickets (ticket_number, client_id, client_name, body, predicted_queue,
                                 generated_reply, status, assigned_department, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            "#,
            params![
                &ticket.ticket_number,
                ticket.client_id,
                &ticket.client_name,
                &ticket.body,
                &ticket.predicted_queue,
                &ticket.generated_reply,
                ticket.status,
                ticket.assigned_department.as_str(),
                now,
            ],
        )?;

        let id = conn.last_insert_rowid();
        debug!(id, ticket_number = %ticket.ticket_number, "Ticket stored");

        conn.query_row(
            &format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = ?1"),
            params![id],
            ticket_from_row,
        )
        .map_err(Into::into)
    }

    /// Tickets visible under `scope`, newest first
    pub fn list_tickets(&self, scope: TicketScope) -> StoreResult<Vec<Ticket>> {
        let conn = self.lock()?;
        let order = "ORDER BY created_at DESC, id DESC";

        let tickets = match scope {
            TicketScope::All => {
                let mut stmt = conn.prepare(&format!("SELECT {TICKET_COLUMNS} FROM tickets {order}"))?;
                let rows = stmt.query_map([], ticket_from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            TicketScope::Client(client_id) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {TICKET_COLUMNS} FROM tickets WHERE client_id = ?1 {order}"
                ))?;
                let rows = stmt.query_map(params![client_id], ticket_from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            TicketScope::Department(department) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {TICKET_COLUMNS} FROM tickets WHERE assigned_department = ?1 {order}"
                ))?;
                let rows = stmt.query_map(params![department.as_str()], ticket_from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };

        Ok(tickets)
    }

    pub fn count_tickets(&self) -> StoreResult<i64> {
        let conn = self.lock()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM tickets", [], |row| row.get(0))?)
    }

    pub fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, username, password, full_name, role, created_at FROM users WHERE username = ?1",
            params![username],
            user_from_row,
        )
        .optional()
        .map_err(Into::into)
    }

    pub fn insert_user(&self, user: &NewUser) -> StoreResult<User> {
        let conn = self.lock()?;
        let now = Utc::now();

        conn.execute(
            "INSERT INTO users (username, password, full_name, role, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![&user.username, &user.password, &user.full_name, user.role, now],
        )?;

        Ok(User {
            id: conn.last_insert_rowid(),
            username: user.username.clone(),
            password: user.password.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            created_at: now,
        })
    }

    /// Insert each user whose username is not taken yet, in one transaction
    pub fn seed_users(&self, users: &[NewUser]) -> StoreResult<SeedReport> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut created = Vec::new();
        let now = Utc::now();

        for user in users {
            let exists: Option<i64> = tx
                .query_row(
                    "SELECT id FROM users WHERE username = ?1",
                    params![&user.username],
                    |row| row.get(0),
                )
                .optional()?;

            if exists.is_none() {
                tx.execute(
                    "INSERT INTO users (username, password, full_name, role, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![&user.username, &user.password, &user.full_name, user.role, now],
                )?;
                created.push(user.username.clone());
            }
        }

        tx.commit()?;
        Ok(SeedReport { created })
    }

    pub fn seed_default_users(&self) -> StoreResult<SeedReport> {
        self.seed_users(&default_users())
    }
}

fn ticket_from_row(row: &Row<'_>) -> rusqlite::Result<Ticket> {
    Ok(Ticket {
        id: row.get(0)?,
        ticket_number: row.get(1)?,
        client_id: row.get(2)?,
        client_name: row.get(3)?,
        body: row.get(4)?,
        predicted_queue: row.get(5)?,
        generated_reply: row.get(6)?,
        status: row.get(7)?,
        assigned_department: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
        full_name: row.get(3)?,
        role: row.get(4)?,
        created_at: row.get(5)?,
    })
}
