//! Live dashboard event stream over WebSocket.

pub mod handler;

pub use handler::ws_handler;
