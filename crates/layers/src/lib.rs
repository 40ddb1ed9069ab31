pub mod color_scale;
pub mod compositor;
pub mod hotspots;
pub mod layer;
pub mod lod;
pub mod picking;
pub mod selection;
pub mod symbology;

pub use color_scale::{ColorScale, ColorScaleError, StressBand};
pub use compositor::*;
pub use hotspots::{HOTSPOT_THRESHOLD, filter_hotspots, hotspot_selection};
pub use layer::*;
pub use lod::{LodConfig, LodConfigError, LodTier};
pub use picking::*;
pub use selection::FeatureSelection;
pub use symbology::*;
