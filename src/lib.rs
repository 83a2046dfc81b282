//! PollSock Echo - Main Library
//!
//! This crate provides the shared pieces of the pollsock diagnostic
//! binaries.
//!
//! ## Architecture
//!
//! - **bin_common**: Common utilities for binary executables (settings, runners)
//! - **pollsock**: Poll-based WebSocket client (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust,ignore
//! use pollsock_echo::bin_common::{load_settings_from_env, RunConfig};
//! use pollsock_echo::pollsock::Socket;
//! ```

// Re-export workspace libraries for convenience
pub use pollsock;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;
    pub mod runner;

    pub use cli::{load_settings_from_env, parse_args, settings_from_lookup, ProbeSettings, Setting};
    pub use runner::{wait_while, BinaryRunner, RunConfig};
}
