mod extract;
mod layout;
mod store;

pub use layout::AddonsLayout;
pub use store::AddonDirStore;

use std::path::{Path, PathBuf};

use anyhow::Result;

use addonup_core::ReleaseMetadata;

/// Fetch/install collaborators for one addon release. The update flow drives
/// these in a fixed order: fetch, erase_modules, extract, discard. Fetch and
/// extract failures abort the one addon they belong to; erase and discard
/// are deliberately best-effort and never fail.
pub trait ArtifactStore {
    /// Downloads the release artifact and returns its local cache path.
    fn fetch(&self, release: &ReleaseMetadata) -> Result<PathBuf>;

    /// Removes every local directory named in the release's module list.
    /// A directory that does not exist is the normal case on first install;
    /// removal failures are logged and swallowed.
    fn erase_modules(&self, release: &ReleaseMetadata);

    /// Unpacks the fetched artifact into the addons root, overwriting any
    /// files left behind by erase_modules.
    fn extract(&self, artifact: &Path) -> Result<()>;

    /// Deletes the cached artifact. Failure is logged, never fatal.
    fn discard(&self, artifact: &Path);
}
