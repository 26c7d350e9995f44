//! TerraNova API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! background tasks) so integration tests and the binary entrypoint can both
//! access them.

pub mod background;
pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod notifications;
pub mod reply;
pub mod response;
pub mod router;
pub mod routes;
pub mod runtime;
pub mod state;
pub mod ws;
