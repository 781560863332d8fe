//! External collaborator interfaces.
//!
//! The resolution engine never talks to the build-graph generator or the
//! product configuration directly; it sees them only through the traits
//! defined here. This keeps the engine testable without constructing the
//! whole build system.

use std::path::{Path, PathBuf};

/// Environment variable naming the build root all config paths are
/// composed against.
pub const ENV_BUILD_TOP: &str = "BUILD_TOP";

/// Environment variable holding the auto-enablement config path, relative
/// to the build root.
pub const ENV_AE_CONFIG: &str = "VENDOR_CLANG_AE_CONFIG";

/// Environment variable holding the variant config path, relative to the
/// build root.
pub const ENV_VARIANT_CONFIG: &str = "VENDOR_CLANG_CONFIG";

/// Boolean environment override for whether the vendor toolchain variant
/// is enabled.
pub const ENV_VARIANT_ENABLED: &str = "VENDOR_CLANG";

/// Environment override for the variant's primary install path.
pub const ENV_VARIANT_PATH: &str = "VENDOR_CLANG_PATH";

/// Environment override for the variant's secondary install path.
pub const ENV_VARIANT_PATH_2: &str = "VENDOR_CLANG_PATH_2";

/// Environment override for the variant's primary flag string.
pub const ENV_VARIANT_FLAGS: &str = "VENDOR_CLANG_COMMON_FLAGS";

/// Environment override for the variant's secondary flag string.
pub const ENV_VARIANT_FLAGS_2: &str = "VENDOR_CLANG_COMMON_FLAGS_2";

/// Environment variable naming the product being built. Used as the
/// lookup key for per-product variant blocks.
pub const ENV_TARGET_PRODUCT: &str = "TARGET_PRODUCT";

/// Environment override for the prebuilt clang install root.
pub const ENV_CLANG_BASE: &str = "CLANG_PREBUILTS_BASE";

/// Environment override for the prebuilt clang version directory.
pub const ENV_CLANG_VERSION: &str = "CLANG_VERSION";

/// Environment variable holding a wrapper program prefixed onto compile
/// commands (e.g. ccache).
pub const ENV_CC_WRAPPER: &str = "CC_WRAPPER";

/// Runtime configuration supplied by the build system once per invocation.
///
/// Deferred variables are evaluated against this object, so the same build
/// description can vary per invocation without re-registering anything.
/// Implementations must be safe to query from multiple generation workers.
pub trait RuntimeConfig: Send + Sync {
    /// Look up an environment variable, returning the empty string when it
    /// is unset.
    fn getenv(&self, name: &str) -> String;

    /// Tag identifying the host prebuilt directory (e.g. "linux-x86").
    fn host_prebuilt_tag(&self) -> String;

    /// Name of the product being built.
    fn product(&self) -> String;
}

/// Read-only view of the source tree used for path-existence checks.
pub trait SourceTree: Send + Sync {
    /// Whether `rel` exists under the tree root.
    fn exists(&self, rel: &Path) -> bool;
}

/// A [`SourceTree`] backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct DiskSourceTree {
    root: PathBuf,
}

impl DiskSourceTree {
    /// Create a source tree rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DiskSourceTree { root: root.into() }
    }

    /// Get the tree root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SourceTree for DiskSourceTree {
    fn exists(&self, rel: &Path) -> bool {
        self.root.join(rel).exists()
    }
}
