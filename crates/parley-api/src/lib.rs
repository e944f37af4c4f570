//! # parley-api
//!
//! REST API server built with the Axum framework. Thin by design: handlers
//! authenticate, validate, and delegate to `parley-service`.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::run;
