use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const MANIFEST_FILE_NAME: &str = "addonup_manifest.txt";

/// Installed-version value for an entry that has never been installed.
/// The line format requires a whitespace-free token in every column, so the
/// sentinel cannot be the empty string.
pub const UNINSTALLED_VERSION: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryState {
    pub install_alpha: bool,
    pub installed_version: String,
}

/// The durable ledger: one catalog-version stamp plus one entry per tracked
/// addon. Commits always rewrite the whole file, so callers sharing a
/// manifest across threads must serialize {mutate, commit} as one critical
/// section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    path: PathBuf,
    pub catalog_version: String,
    pub entries: BTreeMap<u64, EntryState>,
}

impl Manifest {
    /// Loads the ledger from `<addons_dir>/addonup_manifest.txt`. A missing
    /// file is a fresh start, not an error; an unreadable or malformed file
    /// is fatal because no safe baseline exists.
    pub fn load(addons_dir: &Path) -> Result<Self> {
        let path = addons_dir.join(MANIFEST_FILE_NAME);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(Self {
                    path,
                    catalog_version: String::new(),
                    entries: BTreeMap::new(),
                });
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read manifest: {}", path.display()));
            }
        };

        let (catalog_version, entries) = parse_manifest(&raw)
            .with_context(|| format!("failed to parse manifest: {}", path.display()))?;
        Ok(Self {
            path,
            catalog_version,
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the installed-version token for `id`. No I/O; the caller
    /// commits afterwards. Rejects tokens the line format cannot hold, so a
    /// committed manifest always parses back.
    pub fn update_version(&mut self, id: u64, version: &str) -> Result<()> {
        if version.is_empty() || version.contains(char::is_whitespace) {
            anyhow::bail!("version token '{version}' does not fit a manifest column");
        }
        let entry = self
            .entries
            .get_mut(&id)
            .with_context(|| format!("manifest has no entry for addon {id}"))?;
        entry.installed_version = version.to_string();
        Ok(())
    }

    /// Writes the full ledger to disk. The payload goes to a `.part` sibling
    /// first and is renamed over the target, so a concurrent reader never
    /// observes a truncated manifest.
    pub fn commit(&self) -> Result<()> {
        let payload = self.serialize();
        let part_path = self.path.with_file_name(format!(
            "{}.part",
            self.path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or(MANIFEST_FILE_NAME)
        ));

        fs::write(&part_path, payload.as_bytes())
            .with_context(|| format!("failed to write manifest: {}", part_path.display()))?;
        fs::rename(&part_path, &self.path).with_context(|| {
            format!(
                "failed to move committed manifest into place: {}",
                self.path.display()
            )
        })?;
        Ok(())
    }

    pub fn serialize(&self) -> String {
        let mut payload = String::new();
        payload.push_str(&self.catalog_version);
        payload.push('\n');
        for (id, entry) in &self.entries {
            let install_alpha = if entry.install_alpha { 1 } else { 0 };
            payload.push_str(&format!(
                "{} {} {}\n",
                id, install_alpha, entry.installed_version
            ));
        }
        payload
    }
}

fn parse_manifest(raw: &str) -> Result<(String, BTreeMap<u64, EntryState>)> {
    let mut lines = raw.lines();
    let catalog_version = lines.next().unwrap_or_default().trim().to_string();

    let mut entries = BTreeMap::new();
    for line in lines.map(str::trim).filter(|line| !line.is_empty()) {
        let mut columns = line.split_whitespace();
        let (Some(id), Some(flag), Some(version), None) = (
            columns.next(),
            columns.next(),
            columns.next(),
            columns.next(),
        ) else {
            anyhow::bail!("malformed manifest entry: '{line}'");
        };

        let id: u64 = id
            .parse()
            .with_context(|| format!("invalid addon id in manifest entry: '{line}'"))?;
        let install_alpha = match flag {
            "0" => false,
            "1" => true,
            _ => anyhow::bail!("invalid alpha flag in manifest entry: '{line}'"),
        };

        if entries
            .insert(
                id,
                EntryState {
                    install_alpha,
                    installed_version: version.to_string(),
                },
            )
            .is_some()
        {
            anyhow::bail!("duplicate addon id {id} in manifest");
        }
    }

    Ok((catalog_version, entries))
}
