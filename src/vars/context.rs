//! Named build variables with deferred evaluation.
//!
//! A [`VarContext`] maps variable names to either a fixed string or a
//! closure over the runtime configuration. It is populated once during
//! initialization, single-threaded, and is read-only afterwards: the
//! build-graph generator resolves variables concurrently from its workers,
//! so deferred closures must be pure with respect to shared state.
//!
//! Variables may contain `${OtherName}` references. Those are stored as
//! plain text; expansion is the consumer's job, never this module's.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use anyhow::Result;
use thiserror::Error;

use crate::runtime::{RuntimeConfig, SourceTree};

/// Closure type for deferred variables.
type DeferredFn = Box<dyn Fn(&dyn RuntimeConfig) -> Result<String> + Send + Sync>;

/// Errors from variable registration and resolution.
#[derive(Debug, Error)]
pub enum VarError {
    /// A name was registered twice. Registration is append-only; a second
    /// registration is a programming error, and the context is left
    /// untouched by the failed call.
    #[error("variable `{name}` is already registered")]
    Duplicate {
        /// The offending variable name.
        name: String,
    },

    /// A name was resolved that was never registered.
    #[error("unknown variable `{name}`")]
    Unknown {
        /// The requested variable name.
        name: String,
    },

    /// A deferred closure failed during evaluation.
    #[error("failed to evaluate variable `{name}`")]
    Eval {
        /// The variable whose closure failed.
        name: String,
        /// The underlying failure.
        #[source]
        source: anyhow::Error,
    },
}

enum Variable {
    Static(String),
    Deferred(DeferredFn),
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variable::Static(v) => f.debug_tuple("Static").field(v).finish(),
            Variable::Deferred(_) => f.debug_tuple("Deferred").field(&"<fn>").finish(),
        }
    }
}

/// The namespace of named build variables.
#[derive(Debug, Default)]
pub struct VarContext {
    vars: BTreeMap<String, Variable>,
}

impl VarContext {
    /// Create an empty context.
    pub fn new() -> Self {
        VarContext::default()
    }

    fn insert(&mut self, name: &str, var: Variable) -> Result<(), VarError> {
        if self.vars.contains_key(name) {
            return Err(VarError::Duplicate { name: name.to_string() });
        }
        self.vars.insert(name.to_string(), var);
        Ok(())
    }

    /// Register a fixed string.
    pub fn declare_static(&mut self, name: &str, value: impl Into<String>) -> Result<(), VarError> {
        self.insert(name, Variable::Static(value.into()))
    }

    /// Register a fixed string built from the relative paths that exist
    /// under `tree`, each prefixed with `prefix` and joined with single
    /// spaces.
    ///
    /// Nonexistent paths are dropped silently; some repository checkouts
    /// legitimately omit them. Surviving paths keep their input order.
    pub fn declare_source_path_list(
        &mut self,
        name: &str,
        prefix: &str,
        rel_paths: &[&str],
        tree: &dyn SourceTree,
    ) -> Result<(), VarError> {
        let joined = rel_paths
            .iter()
            .filter(|p| tree.exists(Path::new(*p)))
            .map(|p| format!("{prefix}{p}"))
            .collect::<Vec<_>>()
            .join(" ");
        self.insert(name, Variable::Static(joined))
    }

    /// Register a variable computed from the runtime configuration at
    /// resolution time.
    ///
    /// The closure may return `${Other}` references; they are passed
    /// through to the consumer verbatim.
    pub fn declare_deferred<F>(&mut self, name: &str, f: F) -> Result<(), VarError>
    where
        F: Fn(&dyn RuntimeConfig) -> Result<String> + Send + Sync + 'static,
    {
        self.insert(name, Variable::Deferred(Box::new(f)))
    }

    /// Register a deferred variable backed by a fixed accessor on the
    /// runtime configuration.
    pub fn declare_config_method(
        &mut self,
        name: &str,
        accessor: fn(&dyn RuntimeConfig) -> String,
    ) -> Result<(), VarError> {
        self.insert(name, Variable::Deferred(Box::new(move |config| Ok(accessor(config)))))
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Registered variable names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    /// Resolve a variable against the runtime configuration.
    ///
    /// Static variables ignore `config`; deferred variables invoke their
    /// stored closure. Safe to call concurrently once registration is done.
    pub fn resolve(&self, name: &str, config: &dyn RuntimeConfig) -> Result<String, VarError> {
        match self.vars.get(name) {
            None => Err(VarError::Unknown { name: name.to_string() }),
            Some(Variable::Static(v)) => Ok(v.clone()),
            Some(Variable::Deferred(f)) => f(config).map_err(|source| VarError::Eval {
                name: name.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubConfig;

    struct EmptyTree;
    impl SourceTree for EmptyTree {
        fn exists(&self, _rel: &Path) -> bool {
            false
        }
    }

    struct FullTree;
    impl SourceTree for FullTree {
        fn exists(&self, rel: &Path) -> bool {
            !rel.to_string_lossy().contains("missing")
        }
    }

    #[test]
    fn test_static_resolution() {
        let mut ctx = VarContext::new();
        ctx.declare_static("CommonGlobalCflags", "-W -Wall").unwrap();

        let config = StubConfig::new();
        assert_eq!(ctx.resolve("CommonGlobalCflags", &config).unwrap(), "-W -Wall");
    }

    #[test]
    fn test_duplicate_registration_is_error_and_atomic() {
        let mut ctx = VarContext::new();
        ctx.declare_static("Name", "first").unwrap();

        let err = ctx.declare_static("Name", "second").unwrap_err();
        assert!(matches!(err, VarError::Duplicate { ref name } if name == "Name"));

        // The failed call must not have disturbed the original value.
        let config = StubConfig::new();
        assert_eq!(ctx.resolve("Name", &config).unwrap(), "first");
    }

    #[test]
    fn test_duplicate_across_kinds() {
        let mut ctx = VarContext::new();
        ctx.declare_static("Name", "value").unwrap();
        let err = ctx.declare_deferred("Name", |_| Ok("other".to_string())).unwrap_err();
        assert!(matches!(err, VarError::Duplicate { .. }));
    }

    #[test]
    fn test_unknown_variable() {
        let ctx = VarContext::new();
        let config = StubConfig::new();
        assert!(matches!(
            ctx.resolve("Nope", &config),
            Err(VarError::Unknown { .. })
        ));
    }

    #[test]
    fn test_deferred_reads_config() {
        let mut ctx = VarContext::new();
        ctx.declare_deferred("Wrapper", |config| {
            let v = config.getenv("CC_WRAPPER");
            if v.is_empty() {
                Ok(String::new())
            } else {
                Ok(format!("{v} "))
            }
        })
        .unwrap();

        let mut config = StubConfig::new();
        assert_eq!(ctx.resolve("Wrapper", &config).unwrap(), "");

        config.set_env("CC_WRAPPER", "ccache");
        assert_eq!(ctx.resolve("Wrapper", &config).unwrap(), "ccache ");
    }

    #[test]
    fn test_config_method() {
        let mut ctx = VarContext::new();
        ctx.declare_config_method("HostPrebuiltTag", |c| c.host_prebuilt_tag())
            .unwrap();

        let config = StubConfig::new();
        assert_eq!(ctx.resolve("HostPrebuiltTag", &config).unwrap(), "linux-x86");
    }

    #[test]
    fn test_source_path_list_drops_missing() {
        let mut ctx = VarContext::new();
        ctx.declare_source_path_list(
            "Includes",
            "-I",
            &["a/include", "missing/include", "b/include"],
            &FullTree,
        )
        .unwrap();

        let config = StubConfig::new();
        assert_eq!(
            ctx.resolve("Includes", &config).unwrap(),
            "-Ia/include -Ib/include"
        );
    }

    #[test]
    fn test_source_path_list_all_missing_is_empty() {
        let mut ctx = VarContext::new();
        ctx.declare_source_path_list("Includes", "-I", &["a", "b"], &EmptyTree)
            .unwrap();

        let config = StubConfig::new();
        assert_eq!(ctx.resolve("Includes", &config).unwrap(), "");
    }

    #[test]
    fn test_references_are_not_expanded() {
        let mut ctx = VarContext::new();
        ctx.declare_static("ClangPath", "${ClangBase}/${ClangVersion}").unwrap();

        let config = StubConfig::new();
        // Expansion belongs to the build-graph generator.
        assert_eq!(
            ctx.resolve("ClangPath", &config).unwrap(),
            "${ClangBase}/${ClangVersion}"
        );
    }
}
