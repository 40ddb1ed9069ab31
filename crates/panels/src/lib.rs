//! Floating panel geometry: drag, resize and expand/collapse.
//!
//! Pointer handling here is pure geometry so it can run on every move event.

pub mod controller;
pub mod geometry;
pub mod listeners;

pub use controller::*;
pub use geometry::*;
pub use listeners::*;
