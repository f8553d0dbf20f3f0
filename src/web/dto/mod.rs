//! Data transfer objects for the Web API.

mod request;
mod response;
mod validation;

pub use request::*;
pub use response::*;
pub use validation::*;
