//! Web API module for the campus server.
//!
//! REST API for the school back office: session-cookie authentication,
//! role/permission authorization, staff and whitelist management, and
//! attendance/result records.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
