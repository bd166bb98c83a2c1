//! Reconciliation of remote catalogs against the local tile tree.
//!
//! The resolved remote state of a tile is its newest delta hash when any
//! delta in the window mentions it, otherwise its manifest hash. A job is
//! emitted for a tile iff its zoom is targeted and the local copy is missing
//! or has a different hash.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::{DeltaBatch, DeltaEntry, ManifestEntry};
use crate::download::DownloadJob;
use crate::index::LocalIndex;
use crate::remote::RemoteLayout;
use crate::tile::{DatasetType, TileLocator};

/// What to do with tiles that appear in deltas but not in the manifest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaOnlyPolicy {
    /// Count them but emit no jobs.
    #[default]
    Ignore,
    /// Emit jobs for them after the manifest-ordered jobs.
    Include,
}

/// Counters describing how a plan was derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanStats {
    /// Distinct manifest tiles examined.
    pub manifest_rows: usize,
    /// Repeated manifest rows for an already examined tile.
    pub duplicate_rows: usize,
    /// Tiles skipped because their zoom isn't targeted.
    pub out_of_zoom: usize,
    /// Tiles whose local hash already matches.
    pub up_to_date: usize,
    /// Jobs for tiles with no local copy.
    pub missing_locally: usize,
    /// Jobs for tiles whose local hash differs.
    pub changed: usize,
    /// Manifest tiles whose hash was overridden by a delta.
    pub delta_overrides: usize,
    /// Tiles seen only in deltas.
    pub delta_only: usize,
    /// Jobs emitted for delta-only tiles.
    pub delta_only_jobs: usize,
}

/// Jobs to run plus how they were derived.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcilePlan {
    pub jobs: Vec<DownloadJob>,
    pub stats: PlanStats,
}

impl ReconcilePlan {
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Newest delta entry per tile, with tiles in first-seen chronological order.
struct DeltaOverlay<'a> {
    newest: HashMap<&'a TileLocator, &'a DeltaEntry>,
    order: Vec<&'a TileLocator>,
}

impl<'a> DeltaOverlay<'a> {
    fn build(deltas: &'a [DeltaBatch]) -> Self {
        let mut batches: Vec<&DeltaBatch> = deltas.iter().collect();
        // Stable, so same-date batches keep caller order
        batches.sort_by_key(|b| b.date);

        let mut newest = HashMap::new();
        let mut order = Vec::new();
        for batch in batches {
            for entry in &batch.entries {
                if newest.insert(&entry.locator, entry).is_none() {
                    order.push(&entry.locator);
                }
            }
        }
        Self { newest, order }
    }
}

/// Resolve the effective remote hash of every manifest tile.
///
/// Deltas are applied oldest date first regardless of slice order, so the
/// newest delta wins. Delta-only tiles are not included.
pub fn resolve_hashes(
    manifest: &[ManifestEntry],
    deltas: &[DeltaBatch],
) -> HashMap<TileLocator, String> {
    let overlay = DeltaOverlay::build(deltas);
    manifest
        .iter()
        .map(|entry| {
            let hash = overlay
                .newest
                .get(&entry.locator)
                .map_or(entry.content_hash.as_str(), |delta| delta.content_hash.as_str());
            (entry.locator.clone(), hash.to_string())
        })
        .collect()
}

/// Computes download jobs for one dataset type.
#[derive(Debug, Clone)]
pub struct Reconciler {
    dataset: DatasetType,
    remote: RemoteLayout,
    tile_root: PathBuf,
    zoom_levels: BTreeSet<u8>,
    delta_only: DeltaOnlyPolicy,
}

impl Reconciler {
    /// Create a reconciler.
    ///
    /// # Arguments
    ///
    /// * `dataset` - Dataset type, used for tile URLs
    /// * `remote` - Remote URL templates
    /// * `tile_root` - Local directory of the dataset, `{root}/{type}`
    /// * `zoom_levels` - Zoom levels to mirror
    pub fn new(
        dataset: DatasetType,
        remote: RemoteLayout,
        tile_root: impl Into<PathBuf>,
        zoom_levels: impl IntoIterator<Item = u8>,
    ) -> Self {
        Self {
            dataset,
            remote,
            tile_root: tile_root.into(),
            zoom_levels: zoom_levels.into_iter().collect(),
            delta_only: DeltaOnlyPolicy::default(),
        }
    }

    /// Set the policy for delta-only tiles.
    pub fn with_delta_only(mut self, policy: DeltaOnlyPolicy) -> Self {
        self.delta_only = policy;
        self
    }

    pub fn zoom_levels(&self) -> &BTreeSet<u8> {
        &self.zoom_levels
    }

    /// Diff the resolved remote state against `local`.
    ///
    /// Jobs follow manifest order; each tile appears at most once.
    pub fn reconcile(
        &self,
        manifest: &[ManifestEntry],
        deltas: &[DeltaBatch],
        local: &LocalIndex,
    ) -> ReconcilePlan {
        let overlay = DeltaOverlay::build(deltas);
        let mut plan = ReconcilePlan::default();
        let mut seen: HashSet<&TileLocator> = HashSet::with_capacity(manifest.len());

        for entry in manifest {
            if !seen.insert(&entry.locator) {
                plan.stats.duplicate_rows += 1;
                continue;
            }
            plan.stats.manifest_rows += 1;

            let hash = match overlay.newest.get(&entry.locator) {
                Some(delta) => {
                    plan.stats.delta_overrides += 1;
                    delta.content_hash.as_str()
                }
                None => entry.content_hash.as_str(),
            };
            self.consider(&entry.locator, hash, &entry.listed_path, local, &mut plan);
        }

        for locator in overlay.order.iter().filter(|l| !seen.contains(*l)) {
            plan.stats.delta_only += 1;
            if self.delta_only == DeltaOnlyPolicy::Include {
                let delta = overlay.newest[*locator];
                let before = plan.jobs.len();
                self.consider(locator, &delta.content_hash, &delta.listed_path, local, &mut plan);
                plan.stats.delta_only_jobs += plan.jobs.len() - before;
            }
        }

        if plan.stats.delta_only > 0 && self.delta_only == DeltaOnlyPolicy::Ignore {
            debug!(
                tiles = plan.stats.delta_only,
                "Ignoring tiles listed only in deltas"
            );
        }
        info!(
            dataset = %self.dataset,
            manifest = plan.stats.manifest_rows,
            jobs = plan.len(),
            up_to_date = plan.stats.up_to_date,
            out_of_zoom = plan.stats.out_of_zoom,
            "Reconciled"
        );
        plan
    }

    fn consider(
        &self,
        locator: &TileLocator,
        hash: &str,
        listed_path: &str,
        local: &LocalIndex,
        plan: &mut ReconcilePlan,
    ) {
        if !self.zoom_levels.contains(&locator.zoom) {
            plan.stats.out_of_zoom += 1;
            return;
        }

        match local.get(locator) {
            Some(local_hash) if local_hash == hash => {
                plan.stats.up_to_date += 1;
                return;
            }
            Some(_) => plan.stats.changed += 1,
            None => plan.stats.missing_locally += 1,
        }

        plan.jobs.push(self.job_for(locator, listed_path));
    }

    /// Job fetching `locator` into the dataset tree.
    ///
    /// The URL is built from `listed_path`, the path text the catalog used,
    /// falling back to the canonical path when it isn't a tile path. The
    /// destination is always canonical.
    pub fn job_for(&self, locator: &TileLocator, listed_path: &str) -> DownloadJob {
        let url = self
            .remote
            .listed_tile_url(&self.dataset, listed_path)
            .unwrap_or_else(|| self.remote.tile_url(&self.dataset, locator));
        DownloadJob::new(locator.clone(), url, locator.local_path(&self.tile_root))
    }
}
