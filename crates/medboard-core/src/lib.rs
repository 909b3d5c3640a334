//! medboard-core: data model, session handling, and view state.
//!
//! This crate defines the wire types, the API traits, the explicit session
//! object, and the state machines behind the practice and dashboard views.
//! It performs no I/O of its own; `medboard-client` supplies the HTTP side.

pub mod analytics;
pub mod auth;
pub mod error;
pub mod gate;
pub mod model;
pub mod quiz;
pub mod request;
pub mod session;
pub mod traits;

#[cfg(test)]
mod testing;

pub use error::{ApiError, ErrorClass};
pub use gate::{Navigation, Route, SessionGate};
pub use session::{MemoryStore, Session, SessionStore, SessionToken};
