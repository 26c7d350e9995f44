use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use terranova_events::DashboardEvent;
use tokio::sync::broadcast;

use crate::state::AppState;

/// GET /api/v1/ws
///
/// Upgrades to a WebSocket that pushes every [`DashboardEvent`] as a JSON
/// text frame (`{"type": ..., "payload": ...}`). Inbound frames other than
/// close are ignored.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    // Subscribe before the upgrade completes so no event published after the
    // handshake is missed.
    let events = state.event_bus.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, events))
}

async fn handle_socket(socket: WebSocket, mut events: broadcast::Receiver<DashboardEvent>) {
    let conn_id = uuid::Uuid::new_v4();
    tracing::info!(%conn_id, "Dashboard stream connected");

    let (mut sink, mut stream) = socket.split();

    let send_task = tokio::spawn(async move {
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(%conn_id, skipped = n, "Dashboard stream lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            let Some(message) = event_message(&event) else {
                continue;
            };
            if sink.send(message).await.is_err() {
                tracing::debug!(%conn_id, "Dashboard stream sink closed");
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "Dashboard stream receive error");
                break;
            }
        }
    }

    send_task.abort();
    tracing::info!(%conn_id, "Dashboard stream disconnected");
}

/// Encode an event as a JSON text frame.
pub fn event_message(event: &DashboardEvent) -> Option<Message> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            tracing::error!(error = %e, event = event.event_type(), "Failed to encode event");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_sent_as_tagged_json_text() {
        let id = uuid::Uuid::nil();
        let message = event_message(&DashboardEvent::AlertExpired { id }).unwrap();

        let Message::Text(text) = message else {
            panic!("expected a text frame");
        };
        let json: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(json["type"], "alert_expired");
        assert_eq!(json["payload"]["id"], id.to_string());
    }
}
