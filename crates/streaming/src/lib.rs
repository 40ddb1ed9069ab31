//! Dataset, cell-detail and narrative collaborators.
//!
//! Everything async lives here; the synchronous core only ever receives
//! finished `FeatureCollection`s (or their absence) through [`DatasetStore`].

pub mod config;
pub mod error;
pub mod file;
pub mod http;
pub mod loader;
pub mod memory;
pub mod provider;
pub mod request;
pub mod store;

pub use config::*;
pub use error::*;
pub use file::*;
pub use http::*;
pub use loader::*;
pub use memory::MemoryProvider;
pub use provider::*;
pub use request::*;
pub use store::*;
