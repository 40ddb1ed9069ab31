use std::sync::Arc;

use formats::geojson::{FeatureCollection, GeoFeature};
use formats::scenario::ScenarioParams;
use foundation::color::Rgba;
use runtime::viewport::ViewportState;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color_scale::ColorScale;
use crate::hotspots::{HOTSPOT_THRESHOLD, hotspot_selection};
use crate::layer::{LayerId, LayerVisibility};
use crate::lod::LodConfig;
use crate::selection::FeatureSelection;
use crate::symbology::{FillColors, LayerGeometry, LayerStyle, PickBehavior};

/// Everything composition depends on.
///
/// Collections are `None` when their fetch failed or has not completed; they
/// compose exactly like empty collections.
#[derive(Debug, Clone, Default)]
pub struct CompositionInputs {
    pub grid: Option<Arc<FeatureCollection>>,
    pub trees: Option<Arc<FeatureCollection>>,
    pub planting_sites: Option<Arc<FeatureCollection>>,
    pub visibility: LayerVisibility,
    pub scenario: ScenarioParams,
    pub viewport: ViewportState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    pub color_scale: ColorScale,
    pub lod: LodConfig,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            color_scale: ColorScale::csi(),
            lod: LodConfig::default(),
        }
    }
}

/// The value a grid cell is coloured by.
///
/// With an active scenario this is `csi_scenario`, falling back to
/// `csi_current` for cells the backend did not project.
pub fn cell_stress_value(cell: &GeoFeature, scenario_active: bool) -> f64 {
    if scenario_active {
        cell.csi_scenario().unwrap_or_else(|| cell.csi_current())
    } else {
        cell.csi_current()
    }
}

/// Declarative descriptor handed to the map engine.
#[derive(Debug, Clone)]
pub struct DrawableLayer {
    pub id: LayerId,
    pub geometry: LayerGeometry,
    pub source: Arc<FeatureCollection>,
    pub selection: FeatureSelection,
    pub fill: FillColors,
    pub stroke: Option<Rgba>,
    pub stroke_width_px: f32,
    pub point_radius_px: Option<f32>,
    pub pick: PickBehavior,
}

impl DrawableLayer {
    fn styled(id: LayerId, source: Arc<FeatureCollection>, selection: FeatureSelection) -> Self {
        let style = LayerStyle::for_layer(id);
        Self {
            id,
            geometry: style.geometry,
            source,
            selection,
            fill: style.fill.map_or(FillColors::None, FillColors::Uniform),
            stroke: style.stroke,
            stroke_width_px: style.stroke_width_px,
            point_radius_px: style.point_radius_px,
            pick: style.pick,
        }
    }

    pub fn feature_count(&self) -> usize {
        self.selection.len(self.source.len())
    }

    /// The `position`-th drawn feature.
    pub fn feature(&self, position: usize) -> Option<&GeoFeature> {
        self.selection
            .source_index(position, self.source.len())
            .and_then(|i| self.source.get(i))
    }

    /// Drawn features in draw order, paired with their fill colour.
    pub fn features(&self) -> impl Iterator<Item = (&GeoFeature, Option<Rgba>)> + '_ {
        self.selection
            .iter_indices(self.source.len())
            .enumerate()
            .filter_map(|(pos, i)| self.source.get(i).map(|f| (f, self.fill.color_at(pos))))
    }
}

/// Sources compare by identity; everything else by value.
impl PartialEq for DrawableLayer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && Arc::ptr_eq(&self.source, &other.source)
            && self.geometry == other.geometry
            && self.selection == other.selection
            && self.fill == other.fill
            && self.stroke == other.stroke
            && self.stroke_width_px == other.stroke_width_px
            && self.point_radius_px == other.point_radius_px
            && self.pick == other.pick
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayerSummary {
    pub id: LayerId,
    pub geometry: LayerGeometry,
    pub features: usize,
    pub pickable: bool,
}

/// Ordered layers, bottom first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayerStack {
    layers: Vec<DrawableLayer>,
}

impl LayerStack {
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn get(&self, id: LayerId) -> Option<&DrawableLayer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DrawableLayer> {
        self.layers.iter()
    }

    pub fn ids(&self) -> Vec<LayerId> {
        self.layers.iter().map(|l| l.id).collect()
    }

    pub fn summary(&self) -> Vec<LayerSummary> {
        self.layers
            .iter()
            .map(|l| LayerSummary {
                id: l.id,
                geometry: l.geometry,
                features: l.feature_count(),
                pickable: l.pick.is_pickable(),
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a LayerStack {
    type Item = &'a DrawableLayer;
    type IntoIter = std::slice::Iter<'a, DrawableLayer>;

    fn into_iter(self) -> Self::IntoIter {
        self.layers.iter()
    }
}

fn non_empty(collection: &Option<Arc<FeatureCollection>>) -> Option<&Arc<FeatureCollection>> {
    collection.as_ref().filter(|c| !c.is_empty())
}

/// Build the layer stack for `inputs`. Pure and deterministic.
///
/// Ordering contract:
/// - Layers appear in [`LayerId::DRAW_ORDER`]; hidden or empty layers are omitted.
/// - Only the grid's colours depend on the scenario; hotspots always key on
///   `csi_current`.
pub fn compose_layers(inputs: &CompositionInputs, config: &CompositorConfig) -> LayerStack {
    let mut layers = Vec::with_capacity(4);
    let vis = inputs.visibility;

    if vis.csi
        && let Some(grid) = non_empty(&inputs.grid)
    {
        let active = inputs.scenario.is_active();
        let colors = grid
            .iter()
            .map(|cell| config.color_scale.color_for(cell_stress_value(cell, active)))
            .collect();
        let mut layer = DrawableLayer::styled(LayerId::CsiGrid, grid.clone(), FeatureSelection::All);
        layer.fill = FillColors::PerFeature(colors);
        layers.push(layer);
    }

    if vis.hotspots
        && let Some(grid) = non_empty(&inputs.grid)
    {
        let selection = hotspot_selection(grid, HOTSPOT_THRESHOLD);
        if !selection.is_empty(grid.len()) {
            layers.push(DrawableLayer::styled(LayerId::Hotspots, grid.clone(), selection));
        }
    }

    if vis.trees
        && let Some(trees) = non_empty(&inputs.trees)
    {
        let selection = config.lod.sample_selection(trees.len(), inputs.viewport.zoom);
        if !selection.is_empty(trees.len()) {
            layers.push(DrawableLayer::styled(LayerId::Trees, trees.clone(), selection));
        }
    }

    if vis.planting
        && let Some(sites) = non_empty(&inputs.planting_sites)
    {
        layers.push(DrawableLayer::styled(
            LayerId::PlantingSites,
            sites.clone(),
            FeatureSelection::All,
        ));
    }

    LayerStack { layers }
}

fn same_source(a: &Option<Arc<FeatureCollection>>, b: &Option<Arc<FeatureCollection>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// The inputs that invalidate a composed stack.
#[derive(Debug, Clone)]
struct CompositionKey {
    grid: Option<Arc<FeatureCollection>>,
    trees: Option<Arc<FeatureCollection>>,
    planting_sites: Option<Arc<FeatureCollection>>,
    visibility: LayerVisibility,
    scenario: ScenarioParams,
    zoom_bits: u64,
}

impl CompositionKey {
    fn of(inputs: &CompositionInputs) -> Self {
        Self {
            grid: inputs.grid.clone(),
            trees: inputs.trees.clone(),
            planting_sites: inputs.planting_sites.clone(),
            visibility: inputs.visibility,
            scenario: inputs.scenario,
            zoom_bits: inputs.viewport.zoom.to_bits(),
        }
    }

    fn matches(&self, other: &CompositionKey) -> bool {
        same_source(&self.grid, &other.grid)
            && same_source(&self.trees, &other.trees)
            && same_source(&self.planting_sites, &other.planting_sites)
            && self.visibility == other.visibility
            && self.scenario == other.scenario
            && self.zoom_bits == other.zoom_bits
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CompositorStats {
    pub composed: u64,
    pub reused: u64,
}

/// Result of [`LayerCompositor::compose`].
#[derive(Debug, Clone)]
pub struct Composition {
    pub stack: Arc<LayerStack>,
    pub cache_hit: bool,
}

/// Last-inputs/last-output cache around [`compose_layers`].
///
/// Returns the same `Arc<LayerStack>` while no dependency changed, so the
/// engine can skip re-uploading layers by pointer comparison. Pan, pitch and
/// bearing are not dependencies.
#[derive(Debug, Default)]
pub struct LayerCompositor {
    config: CompositorConfig,
    last: Option<(CompositionKey, Arc<LayerStack>)>,
    stats: CompositorStats,
}

impl LayerCompositor {
    pub fn new(config: CompositorConfig) -> Self {
        Self {
            config,
            last: None,
            stats: CompositorStats::default(),
        }
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    pub fn stats(&self) -> CompositorStats {
        self.stats
    }

    /// Drop the cached stack; the next call recomposes.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    pub fn compose(&mut self, inputs: &CompositionInputs) -> Composition {
        let key = CompositionKey::of(inputs);
        if let Some((last_key, stack)) = &self.last
            && last_key.matches(&key)
        {
            self.stats.reused += 1;
            return Composition {
                stack: stack.clone(),
                cache_hit: true,
            };
        }

        let stack = Arc::new(compose_layers(inputs, &self.config));
        self.stats.composed += 1;
        debug!(
            layers = ?stack.ids(),
            zoom = inputs.viewport.zoom,
            scenario = inputs.scenario.label(),
            "recomposed layer stack"
        );
        self.last = Some((key, stack.clone()));
        Composition {
            stack,
            cache_hit: false,
        }
    }
}
