//! Department routing
//!
//! Maps a predicted queue label onto one of the three staffed departments.

pub mod department;

pub use department::{department_for, Department, DEPARTMENT_TABLE};
