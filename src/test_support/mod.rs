//! Test utilities for ballast unit tests.
//!
//! Only compiled for tests. Provides in-memory stand-ins for the runtime
//! configuration and source tree collaborators.

use std::collections::HashMap;
use std::path::Path;

use crate::runtime::{RuntimeConfig, SourceTree};

/// In-memory runtime configuration with a settable environment.
#[derive(Debug, Clone, Default)]
pub struct StubConfig {
    env: HashMap<String, String>,
    tag: String,
    product: String,
}

impl StubConfig {
    /// A stub with an empty environment and fixed host tag / product.
    pub fn new() -> Self {
        StubConfig {
            env: HashMap::new(),
            tag: "linux-x86".to_string(),
            product: "test_product".to_string(),
        }
    }

    /// Set an environment variable.
    pub fn set_env(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.env.insert(name.into(), value.into());
        self
    }

    /// Set the product name.
    pub fn set_product(&mut self, product: impl Into<String>) -> &mut Self {
        self.product = product.into();
        self
    }
}

impl RuntimeConfig for StubConfig {
    fn getenv(&self, name: &str) -> String {
        self.env.get(name).cloned().unwrap_or_default()
    }

    fn host_prebuilt_tag(&self) -> String {
        self.tag.clone()
    }

    fn product(&self) -> String {
        self.product.clone()
    }
}

/// Source tree where membership is an explicit list of relative paths.
#[derive(Debug, Clone, Default)]
pub struct StubTree {
    paths: Vec<String>,
}

impl StubTree {
    /// A tree containing exactly `paths`.
    pub fn with_paths(paths: &[&str]) -> Self {
        StubTree {
            paths: paths.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl SourceTree for StubTree {
    fn exists(&self, rel: &Path) -> bool {
        self.paths.iter().any(|p| Path::new(p) == rel)
    }
}
