//! Transport layer for project-forge.
//!
//! Provides:
//! - Wire protocol (request and response bodies)
//! - HTTP router (feature: http)

pub mod protocol;

#[cfg(feature = "http")]
pub mod http;

pub use protocol::{
    CommandsRequest, CommandsResponse, ErrorBody, HealthResponse, InstructRequest, SessionQuery,
    SetMessageRequest, SetStructureRequest, StartSessionRequest,
};
