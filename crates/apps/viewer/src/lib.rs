//! CityPulse map session: datasets, layers, scenario panel and narrative,
//! wired together for a host map engine.

pub mod backend;
pub mod config;
pub mod events;
pub mod session;

pub use backend::Backend;
pub use config::ViewerConfig;
pub use events::SessionEvent;
pub use session::*;
