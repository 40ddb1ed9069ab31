use formats::geojson::FeatureCollection;

use crate::selection::FeatureSelection;

/// Upper edge of the "high stress" band; cells strictly above it are hotspots.
pub const HOTSPOT_THRESHOLD: f64 = 70.0;

/// Indices of cells whose current CSI strictly exceeds `threshold`.
///
/// Always keyed on `csi_current`, never on scenario values.
pub fn hotspot_selection(cells: &FeatureCollection, threshold: f64) -> FeatureSelection {
    let indices = cells
        .iter()
        .enumerate()
        .filter(|(_, cell)| cell.csi_current() > threshold)
        .map(|(i, _)| i as u32)
        .collect();
    FeatureSelection::from_sorted(indices)
}

/// Owned subset of hotspot cells, in source order.
pub fn filter_hotspots(cells: &FeatureCollection, threshold: f64) -> FeatureCollection {
    cells
        .iter()
        .filter(|cell| cell.csi_current() > threshold)
        .cloned()
        .collect()
}
