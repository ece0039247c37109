//! WebSocket gateway: translates wire events into hub calls and fans hub
//! broadcasts back out to the socket.
//!
//! Each socket runs one task selecting over three sources: its own incoming
//! frames, its current room group, and the global channel (`room-created` /
//! `room-deleted`). Switching rooms swaps the room subscription in place.

pub mod event;

use std::sync::Arc;

use axum::{
    Router, debug_handler,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message as WsMessage, WebSocket},
    },
    response::IntoResponse,
    routing::get,
};
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::HubError;
use crate::hub::{FALLBACK_ROOM, Hub, Outbound};
use crate::{AppState, validate};
use event::{ClientEvent, ServerEvent};

type Sink = SplitSink<WebSocket, WsMessage>;

pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(chat_ws))
}

#[debug_handler(state = AppState)]
async fn chat_ws(State(hub): State<Arc<Hub>>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

async fn handle_socket(socket: WebSocket, hub: Arc<Hub>) {
    let session_id = Uuid::now_v7();
    let (mut sink, mut stream) = socket.split();
    let mut global_rx = hub.subscribe_global();
    // no room subscription until a successful user-join
    let mut room_rx: Option<broadcast::Receiver<Outbound>> = None;
    let mut current_room: Option<String> = None;

    tracing::debug!(%session_id, "socket connected");

    loop {
        tokio::select! {
            frame = stream.next() => {
                let Some(Ok(frame)) = frame else { break };
                let WsMessage::Text(text) = frame else { continue };
                let Ok(event) = serde_json::from_str::<ClientEvent>(&text) else {
                    continue;
                };
                if !handle_event(event, session_id, &hub, &mut sink, &mut room_rx, &mut current_room).await {
                    break;
                }
            }
            out = room_recv(&mut room_rx) => {
                match out {
                    Ok(out) => {
                        if out.skip_origin && out.origin == Some(session_id) {
                            continue;
                        }
                        if !send_event(&mut sink, &out.event).await {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => room_rx = None,
                }
            }
            out = global_rx.recv() => {
                match out {
                    Ok(out) => {
                        if !handle_global(out, session_id, &hub, &mut sink, &mut room_rx, &mut current_room).await {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    hub.disconnect(session_id);
    tracing::debug!(%session_id, "socket disconnected");
}

async fn handle_event(
    event: ClientEvent,
    session_id: Uuid,
    hub: &Hub,
    sink: &mut Sink,
    room_rx: &mut Option<broadcast::Receiver<Outbound>>,
    current_room: &mut Option<String>,
) -> bool {
    match event {
        ClientEvent::UserJoin { username, room } => {
            let username = match validate::username(&username) {
                Ok(name) => name.to_owned(),
                Err(err) => return send_error(sink, &err.to_string()).await,
            };
            match hub.join(session_id, &username, &room) {
                Ok(entered) => {
                    tracing::info!(%username, %room, "user joined");
                    *room_rx = Some(entered.rx);
                    *current_room = Some(room.clone());
                    let ok = send_event(
                        sink,
                        &ServerEvent::JoinSuccess {
                            username,
                            room: room.clone(),
                        },
                    )
                    .await;
                    if !ok {
                        return false;
                    }
                    if let Some(messages) = entered.history {
                        return send_event(sink, &ServerEvent::RoomMessages { room, messages })
                            .await;
                    }
                    true
                }
                Err(HubError::NoSession) => true,
                Err(err) => send_error(sink, &err.to_string()).await,
            }
        }
        ClientEvent::SendMessage { content, room } => {
            // no session: silent no-op
            if let Some(message) = hub.send_message(session_id, &content, &room) {
                tracing::debug!(%room, id = %message.id, "message stored");
            }
            true
        }
        ClientEvent::SwitchRoom { new_room } => match hub.switch_room(session_id, &new_room) {
            Ok(entered) => {
                *room_rx = Some(entered.rx);
                *current_room = Some(new_room.clone());
                if let Some(messages) = entered.history {
                    return send_event(
                        sink,
                        &ServerEvent::RoomMessages {
                            room: new_room,
                            messages,
                        },
                    )
                    .await;
                }
                true
            }
            Err(HubError::NoSession) => true,
            Err(err) => send_error(sink, &err.to_string()).await,
        },
        ClientEvent::CreateRoom { room_id, room_name } => {
            match hub.create_room(session_id, &room_id, &room_name) {
                Ok(()) => {
                    tracing::info!(%room_id, %room_name, "room created");
                    true
                }
                Err(HubError::NoSession) => true,
                Err(err) => send_error(sink, &err.to_string()).await,
            }
        }
        ClientEvent::DeleteRoom { room_id } => match hub.delete_room(session_id, &room_id) {
            Ok(()) => {
                tracing::info!(%room_id, "room deleted");
                true
            }
            Err(HubError::NoSession) => true,
            Err(err) => send_error(sink, &err.to_string()).await,
        },
    }
}

/// Global events reach every socket. A `room-deleted` matching this
/// socket's current room also forces the relocation to `general`: swap the
/// subscription and replay `general`'s history.
async fn handle_global(
    out: Outbound,
    session_id: Uuid,
    hub: &Hub,
    sink: &mut Sink,
    room_rx: &mut Option<broadcast::Receiver<Outbound>>,
    current_room: &mut Option<String>,
) -> bool {
    if out.skip_origin && out.origin == Some(session_id) {
        return true;
    }

    let relocated = matches!(
        &out.event,
        ServerEvent::RoomDeleted { room_id, .. } if Some(room_id.as_str()) == current_room.as_deref()
    );

    if !send_event(sink, &out.event).await {
        return false;
    }

    if relocated {
        *room_rx = Some(hub.subscribe_room(FALLBACK_ROOM));
        *current_room = Some(FALLBACK_ROOM.to_owned());
        if let Some(messages) = hub.history(FALLBACK_ROOM) {
            return send_event(
                sink,
                &ServerEvent::RoomMessages {
                    room: FALLBACK_ROOM.to_owned(),
                    messages,
                },
            )
            .await;
        }
    }
    true
}

async fn room_recv(
    rx: &mut Option<broadcast::Receiver<Outbound>>,
) -> Result<Outbound, broadcast::error::RecvError> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn send_event(sink: &mut Sink, event: &ServerEvent) -> bool {
    let Ok(text) = serde_json::to_string(event) else {
        return true;
    };
    sink.send(WsMessage::Text(text.into())).await.is_ok()
}

async fn send_error(sink: &mut Sink, message: &str) -> bool {
    send_event(
        sink,
        &ServerEvent::Error {
            message: message.to_owned(),
        },
    )
    .await
}
