//! Domain logic for the TerraNova farm monitor.
//!
//! Everything in this crate is pure: no timers, no I/O, no shared state.
//! Time and randomness are passed in so callers (and tests) control them.

pub mod alert;
pub mod detection;
pub mod error;
pub mod feed;
pub mod history;
pub mod metrics;
pub mod series;
pub mod simulator;
pub mod thresholds;
pub mod types;
pub mod uploads;
