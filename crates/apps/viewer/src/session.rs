use compute::ScenarioMetrics;
use formats::properties::CellDetails;
use formats::scenario::ScenarioParams;
use layers::compositor::{Composition, CompositionInputs, CompositorConfig, LayerCompositor};
use layers::layer::{LayerId, LayerVisibility};
use layers::picking::{PickEvent, PickOutcome, resolve_pick};
use panels::{PanelGeometryController, PanelLimits, PointerListeners};
use runtime::event_bus::EventBus;
use runtime::metrics::{Counter, Metrics};
use runtime::viewport::{ViewportChange, ViewportSize, ViewportState, ViewportTracker};
use streaming::error::ProviderError;
use streaming::loader::{DatasetBundle, fetch_all};
use streaming::provider::{CellDetailProvider, DatasetProvider, NarrativeProvider};
use streaming::request::{RequestTicket, TicketIssuer};
use streaming::store::{DatasetStore, GridUpdate, LoadStatus};
use tracing::{debug, error, info, warn};

use crate::events::SessionEvent;

pub const NO_DATA_NARRATIVE: &str = "No data available to generate narrative.";
pub const NARRATIVE_FAILED: &str = "Failed to generate narrative. Please try again.";

/// A full load handed out by [`MapSession::begin_load`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LoadRequest {
    pub ticket: RequestTicket,
    /// Scenario the grid should be fetched for; `None` for the base grid.
    pub scenario: Option<ScenarioParams>,
}

/// A cell-detail fetch handed out by [`MapSession::begin_cell`].
#[derive(Debug, Clone, PartialEq)]
pub struct CellRequest {
    pub ticket: RequestTicket,
    pub id: String,
    pub scenario: Option<ScenarioParams>,
}

/// A narrative fetch handed out by [`MapSession::begin_narrative`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NarrativeRequest {
    pub ticket: RequestTicket,
    pub scenario: ScenarioParams,
    pub metrics: ScenarioMetrics,
}

/// One map view: datasets, layer toggles, scenario, camera, scenario panel,
/// detail panel and narrative.
///
/// Synchronous methods never touch the network. Every fetch is split into
/// `begin_*` (returns a request), the provider call, and `finish_*`/
/// `complete_*` (folds the result back in); the session is not borrowed
/// while the provider future runs, so panels and layers stay usable. Only
/// the newest request of each kind is applied. The async helpers (`load`,
/// `select_cell`, ...) chain the three steps for callers with nothing else
/// to do meanwhile.
#[derive(Debug)]
pub struct MapSession {
    store: DatasetStore,
    visibility: LayerVisibility,
    scenario: ScenarioParams,
    viewport: ViewportTracker,
    compositor: LayerCompositor,
    events: EventBus<SessionEvent>,
    metrics: Metrics,
    scenario_panel: PanelGeometryController,
    selected_cell: Option<CellDetails>,
    cell_tickets: TicketIssuer,
    narrative: Option<String>,
    narrative_tickets: TicketIssuer,
}

impl MapSession {
    pub fn new(listeners: &PointerListeners, config: CompositorConfig, size: ViewportSize) -> Self {
        Self {
            store: DatasetStore::new(),
            visibility: LayerVisibility::default(),
            scenario: ScenarioParams::default(),
            viewport: ViewportTracker::new(ViewportState::default(), size),
            compositor: LayerCompositor::new(config),
            events: EventBus::new(),
            metrics: Metrics::new(),
            scenario_panel: PanelGeometryController::new(listeners, PanelLimits::default(), size),
            selected_cell: None,
            cell_tickets: TicketIssuer::default(),
            narrative: None,
            narrative_tickets: TicketIssuer::default(),
        }
    }

    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    pub fn status(&self) -> &LoadStatus {
        self.store.status()
    }

    pub fn visibility(&self) -> LayerVisibility {
        self.visibility
    }

    pub fn scenario(&self) -> ScenarioParams {
        self.scenario
    }

    pub fn viewport(&self) -> ViewportState {
        self.viewport.state()
    }

    pub fn scenario_panel(&self) -> &PanelGeometryController {
        &self.scenario_panel
    }

    pub fn scenario_panel_mut(&mut self) -> &mut PanelGeometryController {
        &mut self.scenario_panel
    }

    pub fn selected_cell(&self) -> Option<&CellDetails> {
        self.selected_cell.as_ref()
    }

    pub fn close_cell_panel(&mut self) {
        self.selected_cell = None;
    }

    pub fn narrative(&self) -> Option<&str> {
        self.narrative.as_deref()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain()
    }

    fn active_scenario(&self) -> Option<ScenarioParams> {
        self.scenario.is_active().then_some(self.scenario)
    }

    /// Mark the map as loading and hand out the request to fetch with
    /// [`fetch_all`].
    pub fn begin_load(&mut self) -> LoadRequest {
        LoadRequest {
            ticket: self.store.begin_load(),
            scenario: self.active_scenario(),
        }
    }

    /// Fold a full load in.
    ///
    /// Any failure leaves the session in [`LoadStatus::Failed`]; whatever did
    /// load is kept and composes normally.
    pub fn finish_load(&mut self, request: LoadRequest, bundle: DatasetBundle) -> &LoadStatus {
        self.metrics.record_fetch_latency(bundle.elapsed.as_millis() as u64);
        let failures = [bundle.grid.is_err(), bundle.trees.is_err(), bundle.planting_sites.is_err()];
        for _ in failures.into_iter().filter(|failed| *failed) {
            self.metrics.inc(Counter::ProviderErrors);
        }

        let status = self.store.finish_load(request.ticket, bundle);
        match status {
            LoadStatus::Failed { message } => error!(%message, "map data unavailable"),
            _ => info!("map data loaded"),
        }
        status
    }

    /// Fetch all three collections concurrently.
    pub async fn load<P>(&mut self, provider: &P) -> &LoadStatus
    where
        P: DatasetProvider + ?Sized,
    {
        let request = self.begin_load();
        let bundle = fetch_all(provider, request.scenario.as_ref()).await;
        self.finish_load(request, bundle)
    }

    /// Record new slider values and issue the ticket for the grid re-fetch.
    ///
    /// Values are clamped to slider ranges. The returned ticket must be handed
    /// back with the response; only the newest ticket's grid is applied.
    pub fn set_scenario(&mut self, params: ScenarioParams) -> RequestTicket {
        self.scenario = params.clamped();
        let ticket = self.store.issue_grid_request();
        self.metrics.inc(Counter::GridRequests);
        self.events.emit(SessionEvent::ScenarioChanged {
            params: self.scenario,
            ticket,
        });
        ticket
    }

    /// Fold a grid response into the store; stale tickets are dropped.
    pub fn complete_grid(
        &mut self,
        ticket: RequestTicket,
        result: Result<formats::geojson::FeatureCollection, ProviderError>,
    ) -> GridUpdate {
        let update = self.store.complete_grid(ticket, result);
        match update {
            GridUpdate::Stale => self.metrics.inc(Counter::StaleGridResponses),
            GridUpdate::Failed => self.metrics.inc(Counter::ProviderErrors),
            GridUpdate::Applied => {}
        }
        self.events.emit(SessionEvent::GridUpdated { ticket, update });
        update
    }

    /// Fetch the grid for the current scenario under `ticket`.
    pub async fn refresh_grid<P>(&mut self, provider: &P, ticket: RequestTicket) -> GridUpdate
    where
        P: DatasetProvider + ?Sized,
    {
        let params = self.scenario;
        let result = provider.grid(Some(&params)).await;
        self.complete_grid(ticket, result)
    }

    /// Slider change end to end: new grid, then the open cell's details
    /// under the new scenario.
    pub async fn apply_scenario<P>(&mut self, provider: &P, params: ScenarioParams) -> GridUpdate
    where
        P: DatasetProvider + CellDetailProvider + ?Sized,
    {
        let ticket = self.set_scenario(params);
        let update = self.refresh_grid(provider, ticket).await;
        if let Some(request) = self.refresh_selected_cell() {
            let result = provider
                .cell_details(&request.id, request.scenario.as_ref())
                .await;
            // Failure already logged; the panel keeps its content.
            let _ = self.complete_cell(request, result);
        }
        update
    }

    /// Flip a layer toggle; returns the new visibility.
    pub fn toggle_layer(&mut self, layer: LayerId) -> bool {
        let visible = self.visibility.toggle(layer);
        self.events.emit(SessionEvent::LayerToggled { layer, visible });
        visible
    }

    pub fn on_viewport_change(&mut self, next: ViewportState) -> ViewportChange {
        self.viewport.apply(next)
    }

    /// Window resize: keeps the scenario panel on-screen.
    pub fn resize_viewport(&mut self, size: ViewportSize) {
        if self.viewport.resize(size) {
            self.scenario_panel.set_viewport(size);
        }
    }

    fn composition_inputs(&self) -> CompositionInputs {
        CompositionInputs {
            grid: self.store.grid(),
            trees: self.store.trees(),
            planting_sites: self.store.planting_sites(),
            visibility: self.visibility,
            scenario: self.scenario,
            viewport: self.viewport.state(),
        }
    }

    /// Current layer stack; the same `Arc` until a dependency changes.
    pub fn layers(&mut self) -> Composition {
        let composition = self.compositor.compose(&self.composition_inputs());
        self.metrics.inc(if composition.cache_hit {
            Counter::CompositionsReused
        } else {
            Counter::Compositions
        });
        composition
    }

    /// Resolve an engine click and raise the matching event.
    pub fn handle_pick(&mut self, event: PickEvent) -> PickOutcome {
        self.metrics.inc(Counter::PickEvents);
        let stack = self.layers().stack;
        let outcome = resolve_pick(&stack, event);
        match &outcome {
            PickOutcome::Cell { id } => {
                self.events.emit(SessionEvent::CellSelected { id: id.clone() });
            }
            PickOutcome::PlantingSite { properties } => {
                self.events.emit(SessionEvent::SiteInspected {
                    properties: properties.clone(),
                });
            }
            PickOutcome::Ignored => {}
        }
        outcome
    }

    /// Start fetching `id` for the detail panel under the current scenario.
    /// Supersedes any cell fetch in flight.
    pub fn begin_cell(&mut self, id: &str) -> CellRequest {
        CellRequest {
            ticket: self.cell_tickets.issue(),
            id: id.to_string(),
            scenario: self.active_scenario(),
        }
    }

    /// Re-fetch request for the open cell, if the panel shows one.
    pub fn refresh_selected_cell(&mut self) -> Option<CellRequest> {
        let id = self.selected_cell.as_ref()?.id.clone();
        Some(self.begin_cell(&id))
    }

    /// Fold a cell-detail response in. Returns whether the panel changed.
    ///
    /// A superseded response is dropped. On failure the panel is left as it
    /// was and the error is logged and returned.
    pub fn complete_cell(
        &mut self,
        request: CellRequest,
        result: Result<CellDetails, ProviderError>,
    ) -> Result<bool, ProviderError> {
        if !self.cell_tickets.is_latest(request.ticket) {
            debug!(cell = %request.id, "dropping superseded cell details");
            return Ok(false);
        }
        match result {
            Ok(details) => {
                self.selected_cell = Some(details);
                Ok(true)
            }
            Err(e) => {
                warn!(cell = %request.id, error = %e, "cell details unavailable");
                self.metrics.inc(Counter::ProviderErrors);
                Err(e)
            }
        }
    }

    /// Load a cell into the detail panel.
    pub async fn select_cell<P>(&mut self, provider: &P, id: &str) -> Result<(), ProviderError>
    where
        P: CellDetailProvider + ?Sized,
    {
        let request = self.begin_cell(id);
        let result = provider
            .cell_details(&request.id, request.scenario.as_ref())
            .await;
        self.complete_cell(request, result).map(|_| ())
    }

    /// Citywide metrics for the current grid, if any.
    pub fn scenario_metrics(&self) -> Option<ScenarioMetrics> {
        self.store.grid().and_then(|g| ScenarioMetrics::from_grid(&g))
    }

    /// Request a narrative of the current scenario.
    ///
    /// With no grid there is nothing to describe: the narrative is set to
    /// [`NO_DATA_NARRATIVE`] and `None` is returned.
    pub fn begin_narrative(&mut self) -> Option<NarrativeRequest> {
        let ticket = self.narrative_tickets.issue();
        let Some(metrics) = self.scenario_metrics() else {
            self.narrative = Some(NO_DATA_NARRATIVE.to_string());
            return None;
        };
        Some(NarrativeRequest {
            ticket,
            scenario: self.scenario,
            metrics,
        })
    }

    /// Fold a narrative response in; failures become [`NARRATIVE_FAILED`].
    /// A superseded response leaves the current text alone.
    pub fn finish_narrative(
        &mut self,
        request: NarrativeRequest,
        result: Result<String, ProviderError>,
    ) -> Option<&str> {
        if !self.narrative_tickets.is_latest(request.ticket) {
            debug!(ticket = ?request.ticket, "dropping superseded narrative");
            return self.narrative();
        }
        let text = match result {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "narrative generation failed");
                self.metrics.inc(Counter::ProviderErrors);
                NARRATIVE_FAILED.to_string()
            }
        };
        Some(self.narrative.insert(text).as_str())
    }

    /// Ask for a narrative of the current scenario. Always yields text.
    pub async fn generate_narrative<P>(&mut self, provider: &P) -> &str
    where
        P: NarrativeProvider + ?Sized,
    {
        if let Some(request) = self.begin_narrative() {
            let result = provider
                .scenario_summary(&request.scenario, &request.metrics)
                .await;
            self.finish_narrative(request, result);
        }
        self.narrative().unwrap_or(NO_DATA_NARRATIVE)
    }
}
