use std::sync::Arc;

use formats::geojson::FeatureCollection;
use tracing::{info, warn};

use crate::error::ProviderError;
use crate::loader::DatasetBundle;
use crate::request::{RequestTicket, TicketIssuer};

/// Whole-map load state shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    /// Retryable full-screen error.
    Failed { message: String },
}

impl LoadStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, LoadStatus::Failed { .. })
    }
}

/// Outcome of handing a grid response to the store.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GridUpdate {
    Applied,
    /// A newer request was issued after this one; response dropped.
    Stale,
    /// Fetch failed; the previous grid stays in place.
    Failed,
}

/// Latest successfully fetched collections plus request bookkeeping.
///
/// Ordering contract:
/// - Grid responses apply only if their ticket is the newest issued, so the
///   last scenario the user picked is the one that ends up rendered,
///   whatever order responses arrive in.
/// - Every applied collection gets a fresh `Arc`; identity changes exactly
///   when data changes.
#[derive(Debug, Default)]
pub struct DatasetStore {
    grid: Option<Arc<FeatureCollection>>,
    trees: Option<Arc<FeatureCollection>>,
    planting_sites: Option<Arc<FeatureCollection>>,
    status: LoadStatus,
    tickets: TicketIssuer,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grid(&self) -> Option<Arc<FeatureCollection>> {
        self.grid.clone()
    }

    pub fn trees(&self) -> Option<Arc<FeatureCollection>> {
        self.trees.clone()
    }

    pub fn planting_sites(&self) -> Option<Arc<FeatureCollection>> {
        self.planting_sites.clone()
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn latest_ticket(&self) -> Option<RequestTicket> {
        self.tickets.latest()
    }

    /// Start a full load. The returned ticket covers the grid part.
    pub fn begin_load(&mut self) -> RequestTicket {
        self.status = LoadStatus::Loading;
        self.tickets.issue()
    }

    /// Apply a full load. Successful collections are kept even when others
    /// failed; failed ones become absent.
    pub fn finish_load(&mut self, ticket: RequestTicket, bundle: DatasetBundle) -> &LoadStatus {
        let mut failures: Vec<String> = Vec::new();

        if self.tickets.is_latest(ticket) {
            self.grid = take_collection("grid", bundle.grid, &mut failures);
        } else if let Err(e) = bundle.grid {
            info!(?ticket, error = %e, "ignoring failed grid from superseded load");
        }
        self.trees = take_collection("trees", bundle.trees, &mut failures);
        self.planting_sites = take_collection("planting sites", bundle.planting_sites, &mut failures);

        self.status = if failures.is_empty() {
            LoadStatus::Ready
        } else {
            LoadStatus::Failed {
                message: format!("Failed to load data: {}", failures.join("; ")),
            }
        };
        &self.status
    }

    /// Start a scenario grid re-fetch; supersedes any request in flight.
    pub fn issue_grid_request(&mut self) -> RequestTicket {
        self.tickets.issue()
    }

    pub fn complete_grid(
        &mut self,
        ticket: RequestTicket,
        result: Result<FeatureCollection, ProviderError>,
    ) -> GridUpdate {
        if !self.tickets.is_latest(ticket) {
            info!(?ticket, latest = ?self.tickets.latest(), "dropping stale grid response");
            return GridUpdate::Stale;
        }
        match result {
            Ok(grid) => {
                self.grid = Some(Arc::new(grid));
                GridUpdate::Applied
            }
            Err(e) => {
                warn!(?ticket, error = %e, "grid refresh failed; keeping previous grid");
                GridUpdate::Failed
            }
        }
    }
}

fn take_collection(
    name: &str,
    result: Result<FeatureCollection, ProviderError>,
    failures: &mut Vec<String>,
) -> Option<Arc<FeatureCollection>> {
    match result {
        Ok(c) => Some(Arc::new(c)),
        Err(e) => {
            warn!(dataset = name, error = %e, "dataset fetch failed");
            failures.push(format!("{name}: {e}"));
            None
        }
    }
}
