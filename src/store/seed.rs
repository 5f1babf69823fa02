//! Development accounts, one per role

use super::models::{NewUser, UserRole};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub created: Vec<String>,
}

pub fn default_users() -> Vec<NewUser> {
    [
        ("admin", "admin123", "System Administrator", UserRole::Admin),
        ("client1", "client123", "Rajesh Kumar", UserRole::Client),
        ("tech1", "tech123", "Priya Sharma", UserRole::TechnicalSupport),
        ("acc1", "acc123", "Amit Patel", UserRole::Accounting),
        ("sales1", "sales123", "Sneha Reddy", UserRole::Sales),
    ]
    .into_iter()
    .map(|(username, password, full_name, role)| NewUser {
        username: username.to_string(),
        password: password.to_string(),
        full_name: full_name.to_string(),
        role,
    })
    .collect()
}
