use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use tracing::{debug, warn};

use addonup_core::ReleaseMetadata;

use crate::extract::extract_zip;
use crate::{AddonsLayout, ArtifactStore};

/// The real fetch/install collaborator: downloads release archives into the
/// addons directory and unpacks them in place.
#[derive(Debug, Clone)]
pub struct AddonDirStore {
    layout: AddonsLayout,
    client: Client,
}

impl AddonDirStore {
    pub fn new(layout: AddonsLayout) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("failed to build download http client")?;
        Ok(Self { layout, client })
    }
}

impl ArtifactStore for AddonDirStore {
    fn fetch(&self, release: &ReleaseMetadata) -> Result<PathBuf> {
        let target_path = self.layout.artifact_path(&release.file_name);
        let part_path = target_path.with_file_name(format!("{}.part", release.file_name));

        let result = (|| -> Result<()> {
            let mut response = self
                .client
                .get(&release.download_url)
                .send()
                .with_context(|| format!("download failed to send: {}", release.download_url))?;
            let status = response.status();
            if !status.is_success() {
                anyhow::bail!(
                    "download failed: status={status} url={}",
                    release.download_url
                );
            }

            let mut file = fs::File::create(&part_path)
                .with_context(|| format!("failed to create {}", part_path.display()))?;
            io::copy(&mut response, &mut file)
                .with_context(|| format!("download stream failed: {}", release.download_url))?;
            Ok(())
        })();

        if let Err(err) = result {
            let _ = fs::remove_file(&part_path);
            return Err(err);
        }

        fs::rename(&part_path, &target_path).with_context(|| {
            format!(
                "failed to move downloaded artifact into place: {}",
                target_path.display()
            )
        })?;
        Ok(target_path)
    }

    fn erase_modules(&self, release: &ReleaseMetadata) {
        for dir_name in &release.module_dirs {
            let module_path = self.layout.module_path(dir_name);
            debug!(path = %module_path.display(), "erasing module directory");
            match fs::remove_dir_all(&module_path) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => {
                    warn!(path = %module_path.display(), %err, "could not erase module directory");
                }
            }
        }
    }

    fn extract(&self, artifact: &Path) -> Result<()> {
        debug!(path = %artifact.display(), "extracting release archive");
        extract_zip(artifact, self.layout.addons_dir())
    }

    fn discard(&self, artifact: &Path) {
        match fs::remove_file(artifact) {
            Ok(()) => debug!(path = %artifact.display(), "removed cached artifact"),
            Err(err) => {
                warn!(path = %artifact.display(), %err, "could not remove cached artifact");
            }
        }
    }
}
