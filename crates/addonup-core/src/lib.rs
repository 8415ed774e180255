mod manifest;
mod release;

pub use manifest::{EntryState, Manifest, MANIFEST_FILE_NAME, UNINSTALLED_VERSION};
pub use release::{derived_version, select_latest, ReleaseChannel, ReleaseMetadata};
