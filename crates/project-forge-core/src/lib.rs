//! Core abstractions for project-forge.
//!
//! This crate provides the fundamental building blocks:
//! - `Structure` / `Field` - Named record shapes with free-form type tags
//! - `Message` - Named payload records, optionally tied to structures
//! - `ProjectData` - Serializable snapshot of a project
//! - Storage traits and the shared error taxonomy

pub mod model;
pub mod schema;
pub mod traits;

pub use model::{Field, Message, ProjectData, Session, Structure};
pub use traits::{ProjectStorage, SessionStorage, SessionToken, StoreError, StoreStats};
