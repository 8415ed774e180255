use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use addonup_core::{ReleaseChannel, ReleaseMetadata};

use crate::ItemInfo;

#[derive(Debug, Deserialize)]
pub(crate) struct ItemInfoWire {
    name: String,
    #[serde(default, rename = "latestFiles")]
    latest_files: Vec<ReleaseWire>,
}

#[derive(Debug, Deserialize)]
struct ReleaseWire {
    #[serde(rename = "fileName")]
    file_name: String,
    #[serde(rename = "downloadUrl")]
    download_url: String,
    #[serde(rename = "displayName")]
    display_name: String,
    #[serde(rename = "fileDate")]
    file_date: DateTime<Utc>,
    #[serde(rename = "releaseType")]
    release_type: u32,
    #[serde(rename = "gameVersionFlavor")]
    game_version_flavor: String,
    #[serde(default)]
    modules: Vec<ModuleWire>,
}

#[derive(Debug, Deserialize)]
struct ModuleWire {
    foldername: String,
}

pub fn parse_item_info(raw: &str) -> Result<ItemInfo> {
    let wire: ItemInfoWire =
        serde_json::from_str(raw).context("failed to parse catalog item info")?;
    Ok(ItemInfo {
        name: wire.name,
        releases: wire.latest_files.into_iter().map(into_release).collect(),
    })
}

fn into_release(wire: ReleaseWire) -> ReleaseMetadata {
    ReleaseMetadata {
        file_name: wire.file_name,
        download_url: wire.download_url,
        display_name: wire.display_name,
        published_at: wire.file_date,
        channel: ReleaseChannel::from_code(wire.release_type),
        platform_variant: wire.game_version_flavor,
        module_dirs: wire
            .modules
            .into_iter()
            .map(|module| module.foldername)
            .collect(),
    }
}

pub(crate) fn parse_catalog_version(raw: &str) -> Result<String> {
    serde_json::from_str(raw).context("failed to parse catalog version token")
}
