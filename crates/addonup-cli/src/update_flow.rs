use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::thread;

use anyhow::{anyhow, Context, Result};
use tracing::{debug, error, info};

use addonup_catalog::CatalogSource;
use addonup_core::{derived_version, select_latest, Manifest};
use addonup_installer::ArtifactStore;

use crate::render::{render_status_line, OutputStyle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum UpdateOutcome {
    UpToDate,
    Updated { from: String, to: String },
    Failed(String),
}

#[derive(Debug, Clone)]
pub(crate) struct ItemReport {
    pub id: u64,
    pub label: String,
    pub outcome: UpdateOutcome,
}

#[derive(Debug, Clone)]
pub(crate) struct PassReport {
    pub skipped: bool,
    pub items: Vec<ItemReport>,
}

impl PassReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            items: Vec::new(),
        }
    }

    pub fn updated(&self) -> usize {
        self.count(|outcome| matches!(outcome, UpdateOutcome::Updated { .. }))
    }

    pub fn up_to_date(&self) -> usize {
        self.count(|outcome| matches!(outcome, UpdateOutcome::UpToDate))
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, UpdateOutcome::Failed(_)))
    }

    fn count(&self, matches: impl Fn(&UpdateOutcome) -> bool) -> usize {
        self.items
            .iter()
            .filter(|item| matches(&item.outcome))
            .count()
    }
}

fn lock_ledger(ledger: &Mutex<Manifest>) -> Result<MutexGuard<'_, Manifest>> {
    ledger
        .lock()
        .map_err(|_| anyhow!("manifest lock poisoned by another worker"))
}

/// Drives one addon through selection, fetch, install, and ledger recording.
/// Returns the addon's display name alongside the outcome; any error is fatal
/// to this addon only and is converted to a Failed outcome by the caller.
fn update_item<C, S>(
    catalog: &C,
    store: &S,
    ledger: &Mutex<Manifest>,
    id: u64,
    platform_variant: &str,
) -> Result<(String, UpdateOutcome)>
where
    C: CatalogSource,
    S: ArtifactStore,
{
    // Entry snapshot. The brief lock is enough: no other worker touches this
    // id, and the catalog-version stamp is only read at orchestration start.
    let (installed_version, install_alpha) = {
        let ledger = lock_ledger(ledger)?;
        let entry = ledger
            .entries
            .get(&id)
            .with_context(|| format!("manifest has no entry for addon {id}"))?;
        (entry.installed_version.clone(), entry.install_alpha)
    };

    let info = catalog
        .item_info(id)
        .with_context(|| format!("catalog query failed for addon {id}"))?;
    let name = info.name;

    let Some(latest) = select_latest(&info.releases, install_alpha, platform_variant) else {
        debug!(addon = %name, "no applicable release for this variant/channel");
        return Ok((name, UpdateOutcome::UpToDate));
    };

    let latest_version = derived_version(&latest.display_name);
    if latest_version == installed_version {
        info!(addon = %name, version = %installed_version, "up to date");
        return Ok((name, UpdateOutcome::UpToDate));
    }

    info!(
        addon = %name,
        installed = %installed_version,
        latest = %latest_version,
        "out of date, updating"
    );

    let artifact = store
        .fetch(latest)
        .with_context(|| format!("fetch failed for addon '{name}'"))?;
    // Erase before extract so module directories the new release dropped or
    // renamed do not survive from the previous version.
    store.erase_modules(latest);
    store
        .extract(&artifact)
        .with_context(|| format!("install failed for addon '{name}'"))?;
    store.discard(&artifact);

    // Mutation and commit stay inside one critical section: a commit writes
    // the whole manifest, so committing outside the lock could clobber
    // another worker's in-flight update.
    {
        let mut ledger = lock_ledger(ledger)?;
        ledger.update_version(id, &latest_version)?;
        ledger
            .commit()
            .with_context(|| format!("failed to record update for addon '{name}'"))?;
    }

    info!(addon = %name, version = %latest_version, "updated");
    Ok((
        name,
        UpdateOutcome::Updated {
            from: installed_version,
            to: latest_version,
        },
    ))
}

/// Runs one full update pass: loads the ledger, compares catalog stamps, and
/// fans one worker thread out per ledger entry. Per-addon failures are logged
/// and reported but never fail the pass; only an unreadable ledger or a
/// failed top-level catalog-version query aborts before any worker spawns.
pub(crate) fn run_update_pass<C, S>(
    catalog: &C,
    store: &S,
    addons_dir: &Path,
    force: bool,
    platform_variant: &str,
) -> Result<PassReport>
where
    C: CatalogSource + Sync,
    S: ArtifactStore + Sync,
{
    let mut manifest = Manifest::load(addons_dir)?;
    if manifest.entries.is_empty() && manifest.catalog_version.is_empty() {
        info!("no manifest found, starting from an empty ledger");
    }

    let remote_version = catalog
        .catalog_version()
        .context("catalog version check failed")?;
    if remote_version == manifest.catalog_version && !force {
        info!(version = %remote_version, "catalog unchanged, skipping update pass");
        return Ok(PassReport::skipped());
    }

    // In-memory only. The stamp reaches disk with the first successful
    // per-addon commit; a pass where nothing updates leaves the old stamp in
    // place and the next run repeats the top-level query.
    manifest.catalog_version = remote_version;

    let ids: Vec<u64> = manifest.entries.keys().copied().collect();
    let ledger = Mutex::new(manifest);

    let mut items = Vec::with_capacity(ids.len());
    thread::scope(|scope| {
        let handles: Vec<_> = ids
            .iter()
            .map(|&id| {
                let ledger = &ledger;
                scope.spawn(move || update_item(catalog, store, ledger, id, platform_variant))
            })
            .collect();

        for (&id, handle) in ids.iter().zip(handles) {
            let (label, outcome) = match handle.join() {
                Ok(Ok((name, outcome))) => (name, outcome),
                Ok(Err(err)) => {
                    let rendered = format!("{err:#}");
                    error!(addon_id = id, error = %rendered, "addon update failed");
                    (format!("#{id}"), UpdateOutcome::Failed(rendered))
                }
                Err(_) => {
                    error!(addon_id = id, "addon update worker panicked");
                    (
                        format!("#{id}"),
                        UpdateOutcome::Failed("update worker panicked".to_string()),
                    )
                }
            };
            items.push(ItemReport { id, label, outcome });
        }
    });

    Ok(PassReport {
        skipped: false,
        items,
    })
}

pub(crate) fn format_pass_report_lines(report: &PassReport, style: OutputStyle) -> Vec<String> {
    if report.skipped {
        return vec![render_status_line(
            style,
            "ok",
            "catalog unchanged; nothing to do (pass --force to update anyway)",
        )];
    }

    let mut lines = Vec::with_capacity(report.items.len() + 1);
    for item in &report.items {
        lines.push(match &item.outcome {
            UpdateOutcome::UpToDate => {
                render_status_line(style, "step", &format!("{}: up to date", item.label))
            }
            UpdateOutcome::Updated { from, to } => render_status_line(
                style,
                "ok",
                &format!("{}: updated {} -> {}", item.label, from, to),
            ),
            UpdateOutcome::Failed(reason) => render_status_line(
                style,
                "fail",
                &format!("{}: failed: {}", item.label, reason),
            ),
        });
    }
    lines.push(render_status_line(
        style,
        "ok",
        &format!(
            "update pass finished: {} updated, {} up to date, {} failed",
            report.updated(),
            report.up_to_date(),
            report.failed()
        ),
    ));
    lines
}
