//! API handlers for the campus Web API.

pub mod admin;
pub mod auth;
pub mod records;
pub mod staff;

pub use admin::*;
pub use auth::*;
pub use records::*;
pub use staff::*;
