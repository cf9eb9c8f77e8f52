//! API Module
//!
//! HTTP handlers and routing for the cache admin API.
//!
//! # Endpoints
//! - `POST /api/cache/cleanup` - Remove expired entries and report stats
//! - `GET /api/cache/stats` - Report stats without cleanup
//! - `GET /health` - Health check endpoint

pub mod auth;
pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
