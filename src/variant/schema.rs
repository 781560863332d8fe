//! On-disk schema for the variant documents.
//!
//! Both documents are object-rooted UTF-8 JSON. Field presence is
//! modeled with `Option` so the resolver can distinguish "absent" from
//! "set to the default" when applying sparse patches.

use std::collections::BTreeMap;

use serde::Deserialize;

/// One block of the variant document: either the required `default`
/// block or a per-product patch. Every field is optional at the schema
/// level; the resolver enforces which ones the default block must carry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantBlock {
    /// Whether the vendor toolchain is enabled.
    pub enabled: Option<bool>,

    /// Install path of the primary toolchain.
    pub primary_path: Option<String>,

    /// Install path of the secondary toolchain.
    pub secondary_path: Option<String>,

    /// Extra flags for the primary toolchain.
    pub primary_flags: Option<String>,

    /// Extra flags for the secondary toolchain.
    pub secondary_flags: Option<String>,
}

/// The variant document: a mapping from block name to block. The key
/// `"default"` is special; every other key is an opaque product name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VariantDocument(pub BTreeMap<String, VariantBlock>);

impl VariantDocument {
    /// The required default block, if present.
    pub fn default_block(&self) -> Option<&VariantBlock> {
        self.0.get("default")
    }

    /// The sparse patch for `product`, if any.
    pub fn product_block(&self, product: &str) -> Option<&VariantBlock> {
        self.0.get(product)
    }
}

/// The auto-enablement document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AeDocument {
    /// Flag prefixed onto both variant flag strings.
    #[serde(default)]
    pub flag: String,
}
