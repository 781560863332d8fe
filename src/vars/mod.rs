//! The process-wide variable namespace.

pub mod context;

pub use context::{VarContext, VarError};
