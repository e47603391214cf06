//! Shared utilities for the Tenure protocol.

pub mod logging;

pub use logging::init_tracing;
