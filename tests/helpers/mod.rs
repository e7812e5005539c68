//! Shared helpers for integration tests.

pub mod archive_server;
