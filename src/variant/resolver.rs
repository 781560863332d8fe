//! Precedence pipeline for the vendor toolchain variant.
//!
//! Resolution layers, lowest to highest: compiled-in defaults, the
//! `default` block of the variant document, the per-product block, then
//! environment variables. Each layer only touches the fields it explicitly
//! sets. Missing or unreadable documents fall back to the layer below;
//! a *parsed* document missing required data is fatal.
//!
//! Runs once during initialization, before anything queries the variable
//! context. All file I/O happens here; the deferred variables registered
//! at the end only re-read environment variables.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::runtime::{
    ENV_AE_CONFIG, ENV_BUILD_TOP, ENV_TARGET_PRODUCT, ENV_VARIANT_CONFIG, ENV_VARIANT_ENABLED,
    ENV_VARIANT_FLAGS, ENV_VARIANT_FLAGS_2, ENV_VARIANT_PATH, ENV_VARIANT_PATH_2,
};
use crate::variant::schema::{AeDocument, VariantDocument};
use crate::vars::{VarContext, VarError};

/// Compiled-in default: the vendor variant is enabled until something
/// says otherwise.
const DEFAULT_ENABLED: bool = true;

/// Fatal misconfigurations. The resolver returns these instead of
/// aborting; terminating the process is the top-level caller's job.
#[derive(Debug, Error)]
pub enum VariantError {
    /// The variant document parsed but has no `default` block.
    #[error("`default` block is required in the variant config file {path}")]
    MissingDefaultBlock {
        /// The document that was parsed.
        path: PathBuf,
    },

    /// The default block omits a field it must carry.
    #[error("`{field}` is required in the default block of {path}")]
    MissingRequiredField {
        /// The missing JSON field.
        field: &'static str,
        /// The document that was parsed.
        path: PathBuf,
    },

    /// No layer produced a value for a required path.
    #[error("{var} can not be empty: set it in the variant config file or the environment")]
    EmptyPath {
        /// The environment variable that could have supplied the path.
        var: &'static str,
    },
}

/// Everything the resolver reads from the process environment, gathered
/// up front so resolution itself is a pure function of this struct.
#[derive(Debug, Clone, Default)]
pub struct VariantSources {
    /// Product name used as the per-product block key.
    pub product: String,
    /// Build root both document paths are composed against.
    pub build_top: String,
    /// Auto-enablement document path, relative to the build root.
    pub ae_config_rel: String,
    /// Variant document path, relative to the build root.
    pub config_rel: String,
    /// Raw boolean override for `enabled`.
    pub env_enabled: String,
    /// Override for the primary toolchain path.
    pub env_primary_path: String,
    /// Override for the secondary toolchain path.
    pub env_secondary_path: String,
    /// Override for the primary flag string.
    pub env_primary_flags: String,
    /// Override for the secondary flag string.
    pub env_secondary_flags: String,
}

impl VariantSources {
    /// Gather sources from the process environment.
    pub fn from_env() -> Self {
        Self::gather(|name| std::env::var(name).unwrap_or_default())
    }

    /// Gather sources through an arbitrary environment lookup.
    pub fn gather(getenv: impl Fn(&str) -> String) -> Self {
        VariantSources {
            product: getenv(ENV_TARGET_PRODUCT),
            build_top: getenv(ENV_BUILD_TOP),
            ae_config_rel: getenv(ENV_AE_CONFIG),
            config_rel: getenv(ENV_VARIANT_CONFIG),
            env_enabled: getenv(ENV_VARIANT_ENABLED),
            env_primary_path: getenv(ENV_VARIANT_PATH),
            env_secondary_path: getenv(ENV_VARIANT_PATH_2),
            env_primary_flags: getenv(ENV_VARIANT_FLAGS),
            env_secondary_flags: getenv(ENV_VARIANT_FLAGS_2),
        }
    }

    fn ae_config_path(&self) -> PathBuf {
        Path::new(&self.build_top).join(&self.ae_config_rel)
    }

    fn config_path(&self) -> PathBuf {
        Path::new(&self.build_top).join(&self.config_rel)
    }
}

/// The final, immutable result of layering every source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVariant {
    /// Whether the vendor toolchain is active for this invocation.
    pub enabled: bool,
    /// Primary toolchain install path.
    pub primary_path: String,
    /// Secondary toolchain install path.
    pub secondary_path: String,
    /// Extra flags for the primary toolchain, without the AE prefix.
    pub primary_flags: String,
    /// Extra flags for the secondary toolchain, without the AE prefix.
    pub secondary_flags: String,
    /// Auto-enablement flag from the AE document, possibly empty.
    pub ae_flag: String,
}

/// Parse a boolean override the permissive way: `1`/`t`/`true` and
/// `0`/`f`/`false`, case-insensitive. Anything else is ignored.
fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Some(true),
        "0" | "f" | "false" => Some(false),
        _ => None,
    }
}

/// Load the AE flag. Any failure means "no flag"; a deployment without
/// the document is normal.
fn load_ae_flag(path: &Path) -> String {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            debug!("no auto-enablement config at {}: {}", path.display(), err);
            return String::new();
        }
    };
    match serde_json::from_str::<AeDocument>(&text) {
        Ok(doc) => doc.flag,
        Err(err) => {
            debug!("malformed auto-enablement config {}: {}", path.display(), err);
            String::new()
        }
    }
}

/// Load the variant document. `None` means "not there / unreadable /
/// malformed", all of which leave the compiled-in defaults standing.
fn load_document(path: &Path) -> Option<VariantDocument> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            debug!("no variant config at {}: {}", path.display(), err);
            return None;
        }
    };
    match serde_json::from_str(&text) {
        Ok(doc) => Some(doc),
        Err(err) => {
            debug!("malformed variant config {}: {}", path.display(), err);
            None
        }
    }
}

/// Resolve the vendor toolchain variant from every layer.
///
/// Note the pinned ordering: required-field checks on a parsed default
/// block fire before environment layering, so an environment override
/// cannot rescue a document that is structurally invalid. A missing
/// document, by contrast, is rescued by the environment as long as both
/// paths end up non-empty.
pub fn resolve_variant(sources: &VariantSources) -> Result<ResolvedVariant, VariantError> {
    let ae_flag = load_ae_flag(&sources.ae_config_path());

    let mut enabled = DEFAULT_ENABLED;
    let mut primary_path = String::new();
    let mut secondary_path = String::new();
    let mut primary_flags = String::new();
    let mut secondary_flags = String::new();

    let config_path = sources.config_path();
    if let Some(doc) = load_document(&config_path) {
        let default = doc
            .default_block()
            .ok_or_else(|| VariantError::MissingDefaultBlock { path: config_path.clone() })?;

        if let Some(e) = default.enabled {
            enabled = e;
        }
        primary_path = default.primary_path.clone().ok_or_else(|| {
            VariantError::MissingRequiredField { field: "primaryPath", path: config_path.clone() }
        })?;
        secondary_path = default.secondary_path.clone().ok_or_else(|| {
            VariantError::MissingRequiredField { field: "secondaryPath", path: config_path.clone() }
        })?;
        primary_flags = default.primary_flags.clone().unwrap_or_default();
        secondary_flags = default.secondary_flags.clone().unwrap_or_default();

        // Per-product blocks are sparse patches: only fields they set
        // override the default block.
        if let Some(patch) = doc.product_block(&sources.product) {
            if let Some(e) = patch.enabled {
                enabled = e;
            }
            if let Some(p) = &patch.primary_path {
                primary_path = p.clone();
            }
            if let Some(p) = &patch.secondary_path {
                secondary_path = p.clone();
            }
            if let Some(f) = &patch.primary_flags {
                primary_flags = f.clone();
            }
            if let Some(f) = &patch.secondary_flags {
                secondary_flags = f.clone();
            }
        }
    }

    // Environment overrides, highest precedence. A malformed boolean is
    // ignored rather than fatal.
    if let Some(o) = parse_bool(&sources.env_enabled) {
        enabled = o;
    }
    if !sources.env_primary_path.is_empty() {
        primary_path = sources.env_primary_path.clone();
    }
    if !sources.env_secondary_path.is_empty() {
        secondary_path = sources.env_secondary_path.clone();
    }
    if !sources.env_primary_flags.is_empty() {
        primary_flags = sources.env_primary_flags.clone();
    }
    if !sources.env_secondary_flags.is_empty() {
        secondary_flags = sources.env_secondary_flags.clone();
    }

    // No layer at all supplied the paths. This holds even when no
    // document was ever found: a deployment with neither config nor
    // environment variable is misconfigured.
    if primary_path.is_empty() {
        return Err(VariantError::EmptyPath { var: ENV_VARIANT_PATH });
    }
    if secondary_path.is_empty() {
        return Err(VariantError::EmptyPath { var: ENV_VARIANT_PATH_2 });
    }

    Ok(ResolvedVariant {
        enabled,
        primary_path,
        secondary_path,
        primary_flags,
        secondary_flags,
        ae_flag,
    })
}

/// Register the four variant variables.
///
/// Each closure re-checks its environment variable at evaluation time, so
/// an environment change between registration and evaluation (test
/// harnesses do this) is honored. Only the path and flag variables get
/// the re-check; the boolean does not.
pub fn register_variant(ctx: &mut VarContext, resolved: &ResolvedVariant) -> Result<(), VarError> {
    let primary_path = resolved.primary_path.clone();
    ctx.declare_deferred("VendorClangBin", move |config| {
        let override_ = config.getenv(ENV_VARIANT_PATH);
        if !override_.is_empty() {
            return Ok(override_);
        }
        Ok(primary_path.clone())
    })?;

    let secondary_path = resolved.secondary_path.clone();
    ctx.declare_deferred("VendorClangBin2", move |config| {
        let override_ = config.getenv(ENV_VARIANT_PATH_2);
        if !override_.is_empty() {
            return Ok(override_);
        }
        Ok(secondary_path.clone())
    })?;

    let primary_flags = format!("{} {}", resolved.ae_flag, resolved.primary_flags);
    ctx.declare_deferred("VendorClangFlags", move |config| {
        let override_ = config.getenv(ENV_VARIANT_FLAGS);
        if !override_.is_empty() {
            return Ok(override_);
        }
        Ok(primary_flags.clone())
    })?;

    let secondary_flags = format!("{} {}", resolved.ae_flag, resolved.secondary_flags);
    ctx.declare_deferred("VendorClangFlags2", move |config| {
        let override_ = config.getenv(ENV_VARIANT_FLAGS_2);
        if !override_.is_empty() {
            return Ok(override_);
        }
        Ok(secondary_flags.clone())
    })?;

    Ok(())
}
