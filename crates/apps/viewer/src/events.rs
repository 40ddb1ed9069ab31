use formats::scenario::ScenarioParams;
use layers::layer::LayerId;
use serde_json::{Map, Value};
use streaming::request::RequestTicket;
use streaming::store::GridUpdate;

/// Notifications raised by [`crate::MapSession`] for the host UI.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A grid cell was clicked; the host opens the detail panel.
    CellSelected { id: String },
    /// A planting site was clicked; payload feeds the tooltip.
    SiteInspected { properties: Map<String, Value> },
    LayerToggled { layer: LayerId, visible: bool },
    ScenarioChanged { params: ScenarioParams, ticket: RequestTicket },
    GridUpdated { ticket: RequestTicket, update: GridUpdate },
}
