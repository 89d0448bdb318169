//! API Module
//!
//! HTTP handlers and routing for the cache service.
//!
//! # Endpoints
//! - `PUT /set` - Save a payload with freshness settings
//! - `GET /get/:key` - Read a payload and its freshness state
//! - `GET /has/:key` - Check whether a key is present
//! - `DELETE /del/:key` - Delete a key
//! - `GET /stats` - Backend statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
