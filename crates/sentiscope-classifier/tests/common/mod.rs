//! Shared helpers for the classifier integration tests

pub mod mock_backend;
