//! Campus - school back-office server.
//!
//! REST API for a school's administrative, staff, and student portals:
//! session-cookie authentication, role/permission authorization, staff
//! management, the admin whitelist, and attendance/result records.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod web;

pub use auth::{
    hash_password, validate_password, verify_password, Access, Permission, PasswordError,
    Requirement, STAFF_ROLES,
};
pub use config::Config;
pub use db::{
    Database, NewUser, Role, User, UserRepository, UserUpdate, WhitelistRepository,
};
pub use error::{CampusError, Result};
pub use web::{ApiError, AppState, WebServer};
