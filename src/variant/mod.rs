//! Vendor toolchain variant selection.
//!
//! Some products build with a vendor-patched clang installed outside the
//! prebuilts tree. Which products, and where the toolchain lives, is driven
//! by a JSON config merged with environment overrides; `resolver` owns that
//! precedence pipeline and `schema` the on-disk shapes.

pub mod resolver;
pub mod schema;

pub use resolver::{
    register_variant, resolve_variant, ResolvedVariant, VariantError, VariantSources,
};
