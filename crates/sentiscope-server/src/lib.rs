//! SentiScope Server
//!
//! HTTP API over the sentiment classifier and the record store.
//!
//! Handlers validate their input, classify text on the blocking pool and
//! persist results through [`sentiscope_store::Store`]. The binary in
//! `main.rs` wires configuration, tracing and metrics around [`create_router`].

pub mod config;
pub mod error;
pub mod routes;
pub mod security;
pub mod state;
pub mod validation;

pub use config::{ConfigOverrides, ServerConfig};
pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
