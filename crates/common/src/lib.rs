//! Boundary types shared by the image vault crates: the error taxonomy the
//! route layer maps to HTTP, and the JSON records that cross that boundary.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
