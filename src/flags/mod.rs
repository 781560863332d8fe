//! Compiler and linker flag handling.
//!
//! `filter` knows which flags a toolchain cannot accept; `registry` holds
//! the curated global flag lists and writes them into the variable context.

pub mod filter;
pub mod registry;

pub use filter::{filter_unsupported, replace_first, FlagError, ToolchainCapabilities};
pub use registry::{bionic_headers, register_globals};
