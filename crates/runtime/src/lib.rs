pub mod event_bus;
pub mod metrics;
pub mod viewport;

pub use event_bus::*;
pub use metrics::{Counter, Metrics, MetricsSnapshot};
pub use viewport::*;
