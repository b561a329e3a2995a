//! Session-scoped project registry for project-forge.
//!
//! Provides:
//! - `ProjectService` - Token-resolving facade over a storage backend
//! - Structure and message validators
//! - Storage implementations (memory)

pub mod manager;
pub mod storage;
pub mod validate;

pub use manager::{ProjectService, Registration};
pub use validate::{validate_message, validate_structure};
