//! Application runtime
//!
//! Server startup and HTTP wiring.

pub mod server;

pub use server::run_server;
