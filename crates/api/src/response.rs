//! Shared response envelope types for API handlers.
//!
//! Dashboard responses use a `{ "data": ... }` envelope. The chat endpoints
//! (`/chat`, `/upload`) keep their bare payloads so existing chat clients
//! continue to work.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse { data: readings }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
