//! Ballast - layered flag and variable resolution for native build graphs.
//!
//! This crate computes the final set of compiler/linker flag strings and
//! path variables a build-graph generator consumes. Values come from
//! several overlapping sources (compiled-in lists, JSON documents,
//! environment variables, the runtime configuration), layered with defined
//! precedence, with evaluation deferred until generation time where the
//! value depends on the invocation.

pub mod flags;
pub mod runtime;
pub mod variant;
pub mod vars;

/// Test utilities and mocks for ballast unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides in-memory implementations of the runtime
/// configuration and source tree collaborators.
#[cfg(test)]
pub mod test_support;

pub use flags::{filter_unsupported, register_globals, FlagError, ToolchainCapabilities};
pub use runtime::{DiskSourceTree, RuntimeConfig, SourceTree};
pub use variant::{register_variant, resolve_variant, ResolvedVariant, VariantError, VariantSources};
pub use vars::{VarContext, VarError};

use anyhow::{Context, Result};

/// Build a fully populated variable context from the process environment.
///
/// Registers the global flag lists, the toolchain path variables, and the
/// vendor variant variables, in that order. Fatal misconfiguration comes
/// back as an error; terminating the process is the caller's decision.
/// Must run to completion before any concurrent resolution starts.
pub fn init(tree: &dyn SourceTree) -> Result<VarContext> {
    let mut ctx = VarContext::new();

    flags::register_globals(&mut ctx, tree).context("failed to register global flag variables")?;

    let sources = VariantSources::from_env();
    let resolved = resolve_variant(&sources).context("failed to resolve the toolchain variant")?;
    variant::register_variant(&mut ctx, &resolved)
        .context("failed to register variant variables")?;

    Ok(ctx)
}
