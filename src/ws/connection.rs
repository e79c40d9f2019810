//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered events.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::domain::{LadderEvent, PlayerId};
use crate::service::LadderService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards events concerning followed players from the
///   [`broadcast::Receiver`] to the client.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<LadderEvent>,
    ladder_service: Arc<LadderService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();
    tracing::debug!("ws connection opened");

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_text_message(&text, &mut subs, &ladder_service).await;
                        if let Some(json) = encode(&reply)
                            && ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(ladder_event) => {
                        if !subs.matches(&ladder_event) {
                            continue;
                        }
                        let msg = WsMessage::new(
                            uuid::Uuid::new_v4().to_string(),
                            WsMessageType::Event,
                            serde_json::to_value(&ladder_event).unwrap_or_default(),
                        );
                        if let Some(json) = encode(&msg)
                            && ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                    }
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

fn encode(msg: &WsMessage) -> Option<String> {
    serde_json::to_string(msg).ok()
}

/// Handles a text message from the client and builds the reply.
async fn handle_text_message(
    text: &str,
    subs: &mut SubscriptionManager,
    ladder_service: &LadderService,
) -> WsMessage {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return WsMessage::error("", 400, "malformed JSON");
    };
    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return WsMessage::error(msg.id, 404, "unknown command");
    };

    match command {
        WsCommand::Subscribe { player_ids } => {
            let (ids, wildcard) = split_wildcard(player_ids);
            subs.subscribe(&ids, wildcard);
            tracing::debug!(count = subs.count(), wildcard, "ws subscribe");
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "subscribed": ids,
                    "count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::Unsubscribe { player_ids } => {
            let (ids, wildcard) = split_wildcard(player_ids);
            subs.unsubscribe(&ids, wildcard);
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "unsubscribed": ids,
                    "remaining_count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::GetRoster => {
            let players = ladder_service.roster().await;
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({ "players": players }),
            )
        }
        WsCommand::GetPlayer { player_id } => {
            match ladder_service.player(&PlayerId::new(player_id)).await {
                Ok(player) => WsMessage::new(
                    msg.id,
                    WsMessageType::Response,
                    serde_json::to_value(&player).unwrap_or_default(),
                ),
                Err(e) => WsMessage::error(msg.id, e.status_code().as_u16(), e.to_string()),
            }
        }
    }
}

/// Separates the `"*"` wildcard from concrete player ids.
fn split_wildcard(raw: Vec<String>) -> (Vec<PlayerId>, bool) {
    let mut wildcard = false;
    let ids = raw
        .into_iter()
        .filter(|s| {
            let is_star = s == "*";
            wildcard |= is_star;
            !is_star
        })
        .map(PlayerId::new)
        .collect();
    (ids, wildcard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_is_split_from_ids() {
        let (ids, wildcard) = split_wildcard(vec!["a".into(), "*".into(), "b".into()]);
        assert!(wildcard);
        assert_eq!(ids, vec![PlayerId::from("a"), PlayerId::from("b")]);
    }

    #[tokio::test]
    async fn malformed_and_unknown_commands_are_errors() {
        let service = LadderService::new(crate::domain::EventBus::new(4));
        let mut subs = SubscriptionManager::new();

        let reply = handle_text_message("{not json", &mut subs, &service).await;
        assert_eq!(reply.msg_type, WsMessageType::Error);

        let text = r#"{"id":"7","type":"command","timestamp":"2024-01-01T00:00:00Z","payload":{"command":"dance"}}"#;
        let reply = handle_text_message(text, &mut subs, &service).await;
        assert_eq!(reply.msg_type, WsMessageType::Error);
        assert_eq!(reply.id, "7");
    }

    #[tokio::test]
    async fn get_roster_returns_players() {
        let service = LadderService::new(crate::domain::EventBus::new(4));
        assert!(service.add_player(None, "Ann", None).await.is_ok());
        let mut subs = SubscriptionManager::new();

        let text = r#"{"id":"1","type":"command","timestamp":"2024-01-01T00:00:00Z","payload":{"command":"get_roster"}}"#;
        let reply = handle_text_message(text, &mut subs, &service).await;
        assert_eq!(reply.msg_type, WsMessageType::Response);
        let players = reply.payload.get("players").and_then(|v| v.as_array());
        assert_eq!(players.map(Vec::len), Some(1));
    }
}
