// SPDX-FileCopyrightText: 2026 Brandmeet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Realtime change-event channel over a phoenix-framed websocket.
//!
//! One subscription joins the `realtime:public:messages` topic with change
//! filters for the subscribed identity on both sides of a message row. A
//! background task pumps decoded events into the subscription's channel and
//! sends heartbeats; dropping the subscription cancels the task, which
//! leaves the topic and closes the socket. That gives every subscribe
//! exactly one matching unsubscribe, tied to the consumer's lifetime.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use brandmeet_core::traits::{MessageSubscription, RealtimeBackend};
use brandmeet_core::types::{ChangeKind, Message, MessageChangeEvent, UserId};
use brandmeet_core::BrandmeetError;

use crate::Backend;

const MESSAGES_TOPIC: &str = "realtime:public:messages";

/// Buffered events per subscription before backpressure applies.
const EVENT_BUFFER: usize = 32;

fn realtime_error(message: impl Into<String>) -> BrandmeetError {
    BrandmeetError::Realtime {
        message: message.into(),
        source: None,
    }
}

/// Websocket endpoint derived from the HTTP base URL.
fn websocket_url(base_url: &str, anon_key: &str) -> String {
    let ws_base = if let Some(rest) = base_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base_url.to_string()
    };
    format!("{ws_base}/realtime/v1/websocket?apikey={anon_key}&vsn=1.0.0")
}

fn join_frame(user: UserId, frame_ref: u64) -> String {
    let change = |filter: String| {
        json!({
            "event": "*",
            "schema": "public",
            "table": "messages",
            "filter": filter,
        })
    };
    json!({
        "topic": MESSAGES_TOPIC,
        "event": "phx_join",
        "payload": {
            "config": {
                "postgres_changes": [
                    change(format!("sender_id=eq.{user}")),
                    change(format!("receiver_id=eq.{user}")),
                ]
            }
        },
        "ref": frame_ref.to_string(),
    })
    .to_string()
}

fn heartbeat_frame(frame_ref: u64) -> String {
    json!({
        "topic": "phoenix",
        "event": "heartbeat",
        "payload": {},
        "ref": frame_ref.to_string(),
    })
    .to_string()
}

fn leave_frame(frame_ref: u64) -> String {
    json!({
        "topic": MESSAGES_TOPIC,
        "event": "phx_leave",
        "payload": {},
        "ref": frame_ref.to_string(),
    })
    .to_string()
}

#[derive(Debug, Deserialize)]
struct InboundFrame {
    event: String,
    #[serde(default)]
    payload: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChangeData {
    #[serde(rename = "type")]
    kind: ChangeKind,
    record: Option<Message>,
}

/// Decodes one inbound frame into a change event touching `user`.
///
/// Non-change frames (join replies, heartbeat acks, presence) and rows not
/// involving `user` decode to `None`. The server already filters by the
/// join config; the identity check here just guards against topic cross-talk.
fn decode_frame(text: &str, user: UserId) -> Option<MessageChangeEvent> {
    let frame: InboundFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(err) => {
            warn!(error = %err, "undecodable realtime frame");
            return None;
        }
    };

    match frame.event.as_str() {
        "postgres_changes" => {
            let data = frame.payload.get("data")?.clone();
            let change: ChangeData = match serde_json::from_value(data) {
                Ok(change) => change,
                Err(err) => {
                    warn!(error = %err, "undecodable change payload");
                    return None;
                }
            };
            if let Some(row) = &change.record
                && row.sender_id != user
                && row.receiver_id != user
            {
                return None;
            }
            Some(MessageChangeEvent {
                kind: change.kind,
                row: change.record,
            })
        }
        "phx_reply" => {
            let status = frame
                .payload
                .get("status")
                .and_then(|s| s.as_str())
                .unwrap_or("unknown");
            if status != "ok" {
                warn!(status, "channel join or heartbeat rejected");
            } else {
                debug!("channel reply ok");
            }
            None
        }
        _ => None,
    }
}

#[async_trait]
impl RealtimeBackend for Backend {
    async fn subscribe_messages(
        &self,
        user: UserId,
    ) -> Result<MessageSubscription, BrandmeetError> {
        let url = websocket_url(&self.shared.base_url, &self.shared.anon_key);
        let (socket, _) = connect_async(&url).await.map_err(|e| BrandmeetError::Realtime {
            message: "websocket connect failed".into(),
            source: Some(Box::new(e)),
        })?;
        let (mut sink, mut stream) = socket.split();

        sink.send(WsMessage::Text(join_frame(user, 1).into()))
            .await
            .map_err(|e| BrandmeetError::Realtime {
                message: "channel join failed".into(),
                source: Some(Box::new(e)),
            })?;
        debug!(%user, "joined messages channel");

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let heartbeat = std::time::Duration::from_secs(self.shared.heartbeat_secs);

        tokio::spawn(async move {
            let mut frame_ref: u64 = 2;
            let mut ticker = tokio::time::interval(heartbeat);
            // The first tick fires immediately; the join already counts.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => {
                        let _ = sink.send(WsMessage::Text(leave_frame(frame_ref).into())).await;
                        let _ = sink.send(WsMessage::Close(None)).await;
                        debug!("left messages channel");
                        break;
                    }
                    _ = ticker.tick() => {
                        frame_ref += 1;
                        if sink
                            .send(WsMessage::Text(heartbeat_frame(frame_ref).into()))
                            .await
                            .is_err()
                        {
                            warn!("heartbeat send failed, closing subscription");
                            break;
                        }
                    }
                    inbound = stream.next() => match inbound {
                        Some(Ok(WsMessage::Text(text))) => {
                            if let Some(event) = decode_frame(&text, user)
                                && tx.send(event).await.is_err()
                            {
                                // Consumer dropped the receiver half.
                                break;
                            }
                        }
                        Some(Ok(WsMessage::Close(_))) | None => {
                            debug!("realtime socket closed by server");
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(err)) => {
                            warn!(error = %err, "realtime socket error");
                            break;
                        }
                    }
                }
            }
        });

        Ok(MessageSubscription::new(rx, move || cancel.cancel()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn user() -> UserId {
        UserId(Uuid::new_v4())
    }

    fn change_frame(kind: &str, sender: UserId, receiver: UserId) -> String {
        json!({
            "topic": MESSAGES_TOPIC,
            "event": "postgres_changes",
            "payload": {
                "data": {
                    "type": kind,
                    "record": {
                        "id": Uuid::new_v4(),
                        "sender_id": sender.0,
                        "receiver_id": receiver.0,
                        "content": "hello",
                        "created_at": Utc::now().to_rfc3339(),
                    }
                }
            },
            "ref": null,
        })
        .to_string()
    }

    #[test]
    fn websocket_url_switches_scheme() {
        assert_eq!(
            websocket_url("https://p.example.co", "key"),
            "wss://p.example.co/realtime/v1/websocket?apikey=key&vsn=1.0.0"
        );
        assert_eq!(
            websocket_url("http://127.0.0.1:4000", "key"),
            "ws://127.0.0.1:4000/realtime/v1/websocket?apikey=key&vsn=1.0.0"
        );
    }

    #[test]
    fn join_frame_carries_both_identity_filters() {
        let u = user();
        let frame: serde_json::Value = serde_json::from_str(&join_frame(u, 1)).unwrap();
        assert_eq!(frame["event"], "phx_join");
        assert_eq!(frame["topic"], MESSAGES_TOPIC);
        let changes = frame["payload"]["config"]["postgres_changes"]
            .as_array()
            .unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0]["filter"], format!("sender_id=eq.{u}"));
        assert_eq!(changes[1]["filter"], format!("receiver_id=eq.{u}"));
    }

    #[test]
    fn decode_frame_yields_insert_event_for_subscriber() {
        let me = user();
        let other = user();
        let event = decode_frame(&change_frame("INSERT", other, me), me).unwrap();
        assert_eq!(event.kind, ChangeKind::Insert);
        assert_eq!(event.row.unwrap().receiver_id, me);
    }

    #[test]
    fn decode_frame_drops_rows_for_other_identities() {
        let me = user();
        let frame = change_frame("INSERT", user(), user());
        assert!(decode_frame(&frame, me).is_none());
    }

    #[test]
    fn decode_frame_ignores_replies_and_garbage() {
        let me = user();
        let reply = json!({
            "topic": MESSAGES_TOPIC,
            "event": "phx_reply",
            "payload": {"status": "ok", "response": {}},
            "ref": "1",
        })
        .to_string();
        assert!(decode_frame(&reply, me).is_none());
        assert!(decode_frame("not json", me).is_none());
    }

    #[test]
    fn decode_frame_handles_delete_without_record() {
        let me = user();
        let frame = json!({
            "topic": MESSAGES_TOPIC,
            "event": "postgres_changes",
            "payload": { "data": { "type": "DELETE", "record": null } },
            "ref": null,
        })
        .to_string();
        let event = decode_frame(&frame, me).unwrap();
        assert_eq!(event.kind, ChangeKind::Delete);
        assert!(event.row.is_none());
    }
}
