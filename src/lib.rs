//! Shelf application library
//!
//! Feature modules and the process bootstrap shared by the `shelf-app`
//! binary and the `shelf` CLI.

pub mod bootstrap;
pub mod modules;

/// Re-export commonly used types
pub use modules::*;
