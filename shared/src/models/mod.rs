//! Data models
//!
//! Records are serialized camelCase; see [`crate::schema`] for the remote
//! row mapping. All record ids are UUID strings, display codes live in a
//! separate field.

pub mod complaint;
pub mod field_visit;
pub mod sale;
pub mod status;
pub mod stock;
pub mod user;

// Re-exports
pub use complaint::*;
pub use field_visit::*;
pub use sale::*;
pub use status::*;
pub use stock::*;
pub use user::*;
