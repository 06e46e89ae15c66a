use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::tracker::TrackerRecord;
use crate::web::server::AppState;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum WsEvent {
    /// Full record, sent as a snapshot on join and again on every change.
    LocationUpdate(TrackerRecord),
}

/// Upgrade handler for `/ws`; each client gets its own relay loop.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| client_loop(socket, state))
}

async fn send_event(socket: &mut WebSocket, event: &WsEvent) -> Result<(), axum::Error> {
    match serde_json::to_string(event) {
        Ok(json) => socket.send(Message::Text(json.into())).await,
        Err(e) => {
            log::warn!("failed to serialize push event: {e}");
            Err(axum::Error::new(e))
        }
    }
}

async fn client_loop(mut socket: WebSocket, state: AppState) {
    let client_id = Uuid::new_v4();

    // Subscribe before reading the snapshot: a publish racing the join lands
    // in our queue instead of slipping between snapshot and subscription.
    let mut sub = state.hub.join();
    log::info!(
        "client {client_id} connected, total clients: {}",
        state.hub.connected_clients()
    );

    // Everything queued up to this point is already reflected in the
    // snapshot; drop it so the client sees the snapshot, then only changes
    // made after it, in order and without duplicates.
    let snapshot = state.store.read();
    sub.drain_backlog();
    if send_event(&mut socket, &WsEvent::LocationUpdate(snapshot))
        .await
        .is_err()
    {
        log::warn!("client {client_id} dropped before snapshot delivery");
        return;
    }

    loop {
        tokio::select! {
            update = sub.recv() => match update {
                Ok(record) => {
                    if let Err(e) = send_event(&mut socket, &WsEvent::LocationUpdate(record)).await {
                        log::info!("client {client_id} send failed, closing: {e}");
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    // Slow consumer; it resumes at a newer record.
                    log::warn!("client {client_id} lagged, skipped {skipped} updates");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                // Observers have nothing to say; drain pings and stray frames.
                Some(Ok(_)) => {}
            },
        }
    }

    drop(sub);
    log::info!(
        "client {client_id} disconnected, total clients: {}",
        state.hub.connected_clients()
    );
}
