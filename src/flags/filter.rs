//! Toolchain-aware flag filtering.

use std::collections::HashSet;

use thiserror::Error;

/// Flags clang rejects outright. These are GCC spellings with no clang
/// equivalent; anything not listed here passes through the filter.
const CLANG_UNSUPPORTED_CFLAGS: &[&str] = &[
    "-finline-functions",
    "-finline-limit=64",
    "-fno-canonical-system-headers",
    "-fno-devirtualize",
    "-fno-tree-sra",
    "-fprefetch-loop-arrays",
    "-funswitch-loops",
    "-Wmaybe-uninitialized",
    "-Wno-error=clobbered",
    "-Wno-error=maybe-uninitialized",
    "-Wno-error=unused-but-set-parameter",
    "-Wno-error=unused-but-set-variable",
    "-Wno-extended-offsetof",
    "-Wno-free-nonheap-object",
    "-Wno-literal-suffix",
    "-Wno-maybe-uninitialized",
    "-Wno-old-style-declaration",
    "-Wno-psabi",
    "-Wno-unused-but-set-parameter",
    "-Wno-unused-but-set-variable",
    "-Wno-unused-local-typedefs",
    "-Wunused-but-set-parameter",
    "-Wunused-but-set-variable",
];

/// Errors from flag-list normalization.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlagError {
    /// A list did not start with the flag the caller promised it would.
    #[error("expected leading flag `{expected}`, found `{actual}`")]
    PrefixMismatch {
        /// The flag the caller expected at the head of the list.
        expected: String,
        /// What was actually there.
        actual: String,
    },
}

/// What a toolchain is known *not* to support.
///
/// This is an unsupported-list, not an allow-list: a flag absent from the
/// set is passed through untouched.
#[derive(Debug, Clone)]
pub struct ToolchainCapabilities {
    unsupported: HashSet<String>,
}

impl ToolchainCapabilities {
    /// Capabilities for a clang-like toolchain.
    pub fn clang() -> Self {
        Self::from_unsupported(CLANG_UNSUPPORTED_CFLAGS.iter().copied())
    }

    /// Capabilities with an explicit unsupported set.
    pub fn from_unsupported<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ToolchainCapabilities {
            unsupported: flags.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `flag` is known to be unsupported.
    pub fn is_unsupported(&self, flag: &str) -> bool {
        self.unsupported.contains(flag)
    }
}

/// Drop the flags `caps` marks unsupported, preserving input order.
///
/// The result is always a subsequence of `flags`. Duplicates survive;
/// last-wins linker semantics depend on order, so nothing is reordered
/// or deduplicated.
pub fn filter_unsupported<'a>(flags: &[&'a str], caps: &ToolchainCapabilities) -> Vec<&'a str> {
    flags
        .iter()
        .copied()
        .filter(|f| !caps.is_unsupported(f))
        .collect()
}

/// Replace the first entry of a flag list, checking it is the one the
/// caller expects. A mismatch means the curated list changed under the
/// caller's feet and is reported with both values.
pub fn replace_first(flags: &mut [String], from: &str, to: &str) -> Result<(), FlagError> {
    match flags.first_mut() {
        Some(head) if head == from => {
            *head = to.to_string();
            Ok(())
        }
        Some(head) => Err(FlagError::PrefixMismatch {
            expected: from.to_string(),
            actual: head.clone(),
        }),
        None => Err(FlagError::PrefixMismatch {
            expected: from.to_string(),
            actual: String::new(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_preserves_order_and_unknowns() {
        let caps = ToolchainCapabilities::clang();
        let flags = [
            "-W",
            "-fno-canonical-system-headers",
            "-Wall",
            "-fsome-flag-nobody-has-heard-of",
            "-Wno-psabi",
            "-O2",
        ];

        let filtered = filter_unsupported(&flags, &caps);
        assert_eq!(
            filtered,
            vec!["-W", "-Wall", "-fsome-flag-nobody-has-heard-of", "-O2"]
        );
    }

    #[test]
    fn test_filter_is_subsequence() {
        let caps = ToolchainCapabilities::clang();
        let flags = ["-a", "-Wmaybe-uninitialized", "-b", "-a"];
        let filtered = filter_unsupported(&flags, &caps);

        // Every surviving flag appears in the input, in the same relative
        // order, duplicates intact.
        assert_eq!(filtered, vec!["-a", "-b", "-a"]);
    }

    #[test]
    fn test_filter_empty_input() {
        let caps = ToolchainCapabilities::clang();
        assert!(filter_unsupported(&[], &caps).is_empty());
    }

    #[test]
    fn test_custom_capabilities() {
        let caps = ToolchainCapabilities::from_unsupported(["-bad"]);
        assert_eq!(filter_unsupported(&["-bad", "-good"], &caps), vec!["-good"]);
    }

    #[test]
    fn test_replace_first() {
        let mut flags = vec!["-O2".to_string(), "-g".to_string()];
        replace_first(&mut flags, "-O2", "-O3").unwrap();
        assert_eq!(flags, vec!["-O3", "-g"]);
    }

    #[test]
    fn test_replace_first_mismatch() {
        let mut flags = vec!["-g".to_string()];
        let err = replace_first(&mut flags, "-O2", "-O3").unwrap_err();
        assert_eq!(
            err,
            FlagError::PrefixMismatch {
                expected: "-O2".to_string(),
                actual: "-g".to_string(),
            }
        );
        // List untouched on failure.
        assert_eq!(flags, vec!["-g"]);
    }
}
