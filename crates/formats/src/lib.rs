pub mod geojson;
pub mod properties;
pub mod scenario;

pub use geojson::*;
pub use properties::*;
pub use scenario::*;
