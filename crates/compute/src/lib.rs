pub mod analysis;
pub mod metrics;

pub use analysis::statistics::*;
pub use metrics::*;
