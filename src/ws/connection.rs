//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding subscribed events.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage};
use super::subscription::SubscriptionManager;
use crate::api::dto::StateResponse;
use crate::app_state::AppState;
use crate::domain::PickerEvent;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and answers them.
/// - Forwards events of subscribed topics from the [`broadcast::Receiver`]
///   to the client.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<PickerEvent>,
    state: AppState,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_text_message(&text, &mut subs, &state);
                        if let Some(json) = to_json(&reply)
                            && ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            // Event from EventBus
            event = event_rx.recv() => {
                match event {
                    Ok(picker_event) if subs.matches(picker_event.topic()) => {
                        let payload = serde_json::to_value(&picker_event).unwrap_or_default();
                        if let Some(json) = to_json(&WsMessage::event(payload))
                            && ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

fn to_json(msg: &WsMessage) -> Option<String> {
    serde_json::to_string(msg)
        .inspect_err(|e| tracing::warn!(error = %e, "failed to encode ws message"))
        .ok()
}

/// Handles a text message from the client and builds the reply.
fn handle_text_message(text: &str, subs: &mut SubscriptionManager, state: &AppState) -> WsMessage {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return WsMessage::error(String::new(), 400, "malformed JSON");
    };
    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return WsMessage::error(msg.id, 404, "unknown command");
    };

    match command {
        WsCommand::Subscribe { topics } => {
            let unknown = subs.subscribe(&topics);
            WsMessage::response(
                msg.id,
                serde_json::json!({
                    "subscribed": subs.topic_names(),
                    "unknown": unknown,
                }),
            )
        }
        WsCommand::Unsubscribe { topics } => {
            subs.unsubscribe(&topics);
            WsMessage::response(
                msg.id,
                serde_json::json!({ "subscribed": subs.topic_names() }),
            )
        }
        WsCommand::GetState => {
            let response = StateResponse::new(
                &state.snapshot(),
                state.picker_service.gate().is_drawing(),
                state.picker_service.ocr_enabled(),
            );
            WsMessage::response(msg.id, serde_json::to_value(response).unwrap_or_default())
        }
    }
}
