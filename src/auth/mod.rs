//! Authentication and authorization primitives.

pub mod password;
pub mod permission;

pub use password::{
    hash_password, validate_password, verify_password, PasswordError, MAX_PASSWORD_LENGTH,
    MIN_PASSWORD_LENGTH,
};
pub use permission::{Access, Permission, Requirement, STAFF_AND_ADMIN_ROLES, STAFF_ROLES};
