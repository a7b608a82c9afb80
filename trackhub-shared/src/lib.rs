//! # TrackHub Shared Library
//!
//! Types and business rules shared by the TrackHub API server.
//!
//! ## Module Organization
//!
//! - `auth`: Passwords, JWTs, bearer authentication and access decisions
//! - `db`: Connection pool and embedded migrations
//! - `deadline`: Remaining-days calculation and urgency labels
//! - `models`: Database models and their queries
//! - `store`: The lookup seam the access checks read through

pub mod auth;
pub mod db;
pub mod deadline;
pub mod models;
pub mod store;

/// Current version of the TrackHub shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
