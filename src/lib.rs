#![doc = "The `taskhive` library crate."]
#![doc = ""]
#![doc = "This crate contains the core business logic for the TaskHive API: the"]
#![doc = "authentication and session subsystem (credential verification, multi-device"]
#![doc = "token issuance and revocation), the ownership-scoped task query engine,"]
#![doc = "domain models, routing configuration, and error handling. It is used by the"]
#![doc = "main binary (`main.rs`) to construct and run the application."]

pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod models;
pub mod query;
pub mod routes;
pub mod sessions;

// lib.rs primarily declares modules for the library crate; the app factory
// lives in main.rs.

// Re-export key types if desired for easier use of the library crate.
// Example:
// pub use crate::error::AppError;
// pub use crate::models::user::{User, UserUpdate};
// pub use crate::models::task::{Task, TaskInput, TaskUpdate};
