//! Request handler module
//!
//! Responsible for request routing dispatch and the three request-facing
//! concerns: the landing page, static assets, and the projects data
//! endpoint.

pub mod pages;
pub mod projects;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
