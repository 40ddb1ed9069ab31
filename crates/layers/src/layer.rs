use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The four overlays of the stress map, in draw order (bottom to top).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerId {
    CsiGrid,
    Hotspots,
    Trees,
    PlantingSites,
}

impl LayerId {
    pub const DRAW_ORDER: [LayerId; 4] = [
        LayerId::CsiGrid,
        LayerId::Hotspots,
        LayerId::Trees,
        LayerId::PlantingSites,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LayerId::CsiGrid => "csi-grid",
            LayerId::Hotspots => "hotspots",
            LayerId::Trees => "trees",
            LayerId::PlantingSites => "planting-sites",
        }
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayerId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LayerId::DRAW_ORDER
            .into_iter()
            .find(|id| id.name() == s)
            .ok_or_else(|| format!("unknown layer '{s}'"))
    }
}

/// User-controlled layer toggles.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerVisibility {
    pub csi: bool,
    pub hotspots: bool,
    pub trees: bool,
    pub planting: bool,
}

impl Default for LayerVisibility {
    fn default() -> Self {
        Self {
            csi: true,
            hotspots: true,
            trees: false,
            planting: false,
        }
    }
}

impl LayerVisibility {
    pub const ALL: LayerVisibility = LayerVisibility {
        csi: true,
        hotspots: true,
        trees: true,
        planting: true,
    };

    pub fn is_visible(&self, id: LayerId) -> bool {
        match id {
            LayerId::CsiGrid => self.csi,
            LayerId::Hotspots => self.hotspots,
            LayerId::Trees => self.trees,
            LayerId::PlantingSites => self.planting,
        }
    }

    pub fn set(&mut self, id: LayerId, visible: bool) {
        let slot = match id {
            LayerId::CsiGrid => &mut self.csi,
            LayerId::Hotspots => &mut self.hotspots,
            LayerId::Trees => &mut self.trees,
            LayerId::PlantingSites => &mut self.planting,
        };
        *slot = visible;
    }

    /// Flip one toggle and return its new state.
    pub fn toggle(&mut self, id: LayerId) -> bool {
        let next = !self.is_visible(id);
        self.set(id, next);
        next
    }
}
