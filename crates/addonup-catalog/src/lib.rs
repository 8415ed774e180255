mod http;
mod wire;

pub use http::{HttpCatalog, DEFAULT_CATALOG_URL};
pub use wire::parse_item_info;

use anyhow::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemInfo {
    pub name: String,
    pub releases: Vec<addonup_core::ReleaseMetadata>,
}

/// Read-only view of the remote catalog. Implementations surface failures to
/// the caller unmodified; whether a failed query is fatal to the whole run or
/// to a single addon is the caller's decision, not the client's.
pub trait CatalogSource {
    fn item_info(&self, id: u64) -> Result<ItemInfo>;

    /// Opaque version token for the catalog as a whole. Equality comparison
    /// is the only defined operation on it.
    fn catalog_version(&self) -> Result<String>;
}
