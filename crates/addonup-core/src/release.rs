use chrono::{DateTime, Utc};

use crate::manifest::UNINSTALLED_VERSION;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseChannel {
    Stable,
    Beta,
    Alpha,
}

impl ReleaseChannel {
    /// Maps the catalog's numeric release-type code. Codes this client does
    /// not know are treated like alpha so they stay behind the opt-in flag.
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Self::Stable,
            2 => Self::Beta,
            _ => Self::Alpha,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Beta => "beta",
            Self::Alpha => "alpha",
        }
    }
}

/// One downloadable release of an addon, as reported by the catalog. Lives
/// only for the duration of a single selection+fetch step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseMetadata {
    pub file_name: String,
    pub download_url: String,
    pub display_name: String,
    pub published_at: DateTime<Utc>,
    pub channel: ReleaseChannel,
    pub platform_variant: String,
    pub module_dirs: Vec<String>,
}

/// Picks the applicable latest release: exact platform-variant match, stable
/// channel only unless `allow_alpha`, then maximum publish timestamp. Strict
/// greater-than comparison keeps the first-seen release on an exact tie, so
/// the result is deterministic for a fixed candidate list. `None` means no
/// release applies to this variant/channel combination, which callers treat
/// as "no update available".
pub fn select_latest<'a>(
    releases: &'a [ReleaseMetadata],
    allow_alpha: bool,
    platform_variant: &str,
) -> Option<&'a ReleaseMetadata> {
    let mut latest: Option<&ReleaseMetadata> = None;
    for release in releases {
        if release.platform_variant != platform_variant {
            continue;
        }
        if !allow_alpha && release.channel != ReleaseChannel::Stable {
            continue;
        }
        if latest.map_or(true, |seen| release.published_at > seen.published_at) {
            latest = Some(release);
        }
    }
    latest
}

/// Derives the version token recorded in the manifest from a release's
/// display name. Whitespace runs collapse to a single underscore so the
/// token is always a single manifest column. A display name with no
/// non-whitespace characters would derive an empty token, which the line
/// format cannot hold, so it falls back to the uninstalled sentinel.
pub fn derived_version(display_name: &str) -> String {
    let token = display_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    if token.is_empty() {
        UNINSTALLED_VERSION.to_string()
    } else {
        token
    }
}
