//! TerraNova dashboard event bus.
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DashboardEvent`] — reading updates and alert lifecycle events.

pub mod bus;

pub use bus::{DashboardEvent, EventBus};
