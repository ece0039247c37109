//! The realtime hub: every piece of gateway state lives here, owned by one
//! injected object instead of module-level globals.
//!
//! Three maps, mirroring the protocol's model:
//! - `sessions`: socket id -> username + current room,
//! - `groups`: room id -> broadcast sender (the room's subscriber group),
//! - `buffers`: room id -> bounded message history.
//!
//! All methods are synchronous and take one lock for their whole body, so
//! each event is atomic with respect to the maps. No two-event sequence is
//! coordinated beyond that; ordering between sockets is dispatch order.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use rand::{Rng, distr::Alphanumeric};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::HubError;
use crate::gateway::event::ServerEvent;

pub const DEFAULT_ROOMS: [&str; 3] = ["general", "tech", "random"];
pub const FALLBACK_ROOM: &str = "general";
pub const MESSAGE_CAP: usize = 100;

const GROUP_CAPACITY: usize = 128;
const CLOCK_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second]");

/// One buffered chat message. Ids are best-effort unique
/// (`msg-<millis>-<random suffix>`); there is no dedup across retries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: String,
    pub author: String,
    pub content: String,
    pub time: String,
    pub timestamp: i64,
}

impl Message {
    pub fn user(author: &str, content: &str) -> Self {
        let now = now_millis();
        Self {
            id: format!("msg-{now}-{}", id_suffix()),
            author: author.to_owned(),
            content: content.to_owned(),
            time: clock_now(),
            timestamp: now,
        }
    }

    pub fn system(id: &str, content: &str) -> Self {
        Self {
            id: id.to_owned(),
            author: "System".to_owned(),
            content: content.to_owned(),
            time: clock_now(),
            timestamp: now_millis(),
        }
    }
}

pub fn clock_now() -> String {
    OffsetDateTime::now_utc()
        .format(CLOCK_FORMAT)
        .unwrap_or_default()
}

fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

fn id_suffix() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(9)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}

/// A broadcast payload, tagged with its origin so room-wide fan-out can
/// skip the socket that caused it (join/leave notices) or include it
/// (new messages).
#[derive(Debug, Clone)]
pub struct Outbound {
    pub origin: Option<Uuid>,
    pub skip_origin: bool,
    pub event: ServerEvent,
}

impl Outbound {
    fn to_all(event: ServerEvent) -> Self {
        Self { origin: None, skip_origin: false, event }
    }

    fn from_origin(origin: Uuid, event: ServerEvent) -> Self {
        Self { origin: Some(origin), skip_origin: false, event }
    }

    fn to_others(origin: Uuid, event: ServerEvent) -> Self {
        Self { origin: Some(origin), skip_origin: true, event }
    }
}

#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub username: String,
    pub room: String,
}

/// Result of a successful join or room switch: the history to replay to
/// the caller (if the room's buffer was ever initialized) and the caller's
/// subscription to the room group.
pub struct Entered {
    pub history: Option<Vec<Message>>,
    pub rx: broadcast::Receiver<Outbound>,
}

struct HubInner {
    sessions: HashMap<Uuid, SessionInfo>,
    groups: HashMap<String, broadcast::Sender<Outbound>>,
    buffers: HashMap<String, VecDeque<Message>>,
}

impl HubInner {
    fn group(&mut self, room: &str) -> &broadcast::Sender<Outbound> {
        self.groups
            .entry(room.to_owned())
            .or_insert_with(|| broadcast::channel(GROUP_CAPACITY).0)
    }

    fn send_to(&mut self, room: &str, out: Outbound) {
        // nobody subscribed yet is fine
        let _ = self.group(room).send(out);
    }

    fn users_in(&self, room: &str) -> Vec<String> {
        self.sessions
            .values()
            .filter(|s| s.room == room)
            .map(|s| s.username.clone())
            .collect()
    }

    fn users_updated(&mut self, room: &str) {
        let users = self.users_in(room);
        let count = users.len();
        let event = ServerEvent::RoomUsersUpdated {
            room: room.to_owned(),
            users,
            count,
        };
        self.send_to(room, Outbound::to_all(event));
    }
}

pub struct Hub {
    inner: Mutex<HubInner>,
    global_tx: broadcast::Sender<Outbound>,
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

impl Hub {
    /// A hub with the three permanent rooms seeded with their welcome
    /// message.
    pub fn new() -> Self {
        let mut buffers = HashMap::new();
        let welcomes = [
            ("general", "Welcome to the General chat room! This is for general discussions."),
            ("tech", "Welcome to Tech Talk! Discuss technology topics here."),
            ("random", "Welcome to Random! Share anything and everything here."),
        ];
        for (n, (room, welcome)) in welcomes.into_iter().enumerate() {
            let id = format!("system-{}", n + 1);
            buffers.insert(room.to_owned(), VecDeque::from([Message::system(&id, welcome)]));
        }

        Self {
            inner: Mutex::new(HubInner {
                sessions: HashMap::new(),
                groups: HashMap::new(),
                buffers,
            }),
            global_tx: broadcast::channel(GROUP_CAPACITY).0,
        }
    }

    /// Every socket subscribes at accept time; `room-created` and
    /// `room-deleted` go to all connected sockets, interested or not.
    pub fn subscribe_global(&self) -> broadcast::Receiver<Outbound> {
        self.global_tx.subscribe()
    }

    pub fn subscribe_room(&self, room: &str) -> broadcast::Receiver<Outbound> {
        self.lock().group(room).subscribe()
    }

    pub fn session(&self, id: Uuid) -> Option<SessionInfo> {
        self.lock().sessions.get(&id).cloned()
    }

    pub fn history(&self, room: &str) -> Option<Vec<Message>> {
        self.lock()
            .buffers
            .get(room)
            .map(|b| b.iter().cloned().collect())
    }

    pub fn users_in(&self, room: &str) -> Vec<String> {
        self.lock().users_in(room)
    }

    /// Registers a session. The username must not collide with any live
    /// session (case-sensitive scan); there is no retry, the caller just
    /// gets one error event.
    pub fn join(&self, id: Uuid, username: &str, room: &str) -> Result<Entered, HubError> {
        let mut inner = self.lock();

        if inner.sessions.values().any(|s| s.username == username) {
            return Err(HubError::UsernameTaken);
        }

        inner.sessions.insert(
            id,
            SessionInfo {
                username: username.to_owned(),
                room: room.to_owned(),
            },
        );

        let rx = inner.group(room).subscribe();
        let history = inner.buffers.get(room).map(|b| b.iter().cloned().collect());

        inner.users_updated(room);
        inner.send_to(
            room,
            Outbound::to_others(
                id,
                ServerEvent::UserJoined {
                    username: username.to_owned(),
                    message: format!("{username} joined the chat"),
                    time: clock_now(),
                },
            ),
        );

        Ok(Entered { history, rx })
    }

    /// Appends and broadcasts a message. A socket with no registered
    /// session is silently ignored: nothing stored, nothing broadcast.
    pub fn send_message(&self, id: Uuid, content: &str, room: &str) -> Option<Message> {
        let mut inner = self.lock();
        let author = inner.sessions.get(&id)?.username.clone();

        let message = Message::user(&author, content);
        let buffer = inner.buffers.entry(room.to_owned()).or_default();
        buffer.push_back(message.clone());
        while buffer.len() > MESSAGE_CAP {
            buffer.pop_front();
        }

        inner.send_to(
            room,
            Outbound::from_origin(id, ServerEvent::NewMessage(message.clone())),
        );
        Some(message)
    }

    /// Moves a session to another room, replaying that room's history to
    /// the caller and emitting paired leave/join notices to the two groups.
    pub fn switch_room(&self, id: Uuid, new_room: &str) -> Result<Entered, HubError> {
        let mut inner = self.lock();
        let Some(session) = inner.sessions.get_mut(&id) else {
            return Err(HubError::NoSession);
        };

        let username = session.username.clone();
        let old_room = std::mem::replace(&mut session.room, new_room.to_owned());

        let rx = inner.group(new_room).subscribe();
        let history = inner
            .buffers
            .get(new_room)
            .map(|b| b.iter().cloned().collect());

        inner.users_updated(&old_room);
        inner.users_updated(new_room);
        inner.send_to(
            &old_room,
            Outbound::to_others(
                id,
                ServerEvent::UserLeft {
                    username: username.clone(),
                    message: format!("{username} left the room"),
                    time: clock_now(),
                },
            ),
        );
        inner.send_to(
            new_room,
            Outbound::to_others(
                id,
                ServerEvent::UserJoined {
                    username: username.clone(),
                    message: format!("{username} joined the room"),
                    time: clock_now(),
                },
            ),
        );

        Ok(Entered { history, rx })
    }

    /// Lazily initializes a room buffer with its welcome message and
    /// announces the room to every connected socket.
    pub fn create_room(&self, id: Uuid, room_id: &str, room_name: &str) -> Result<(), HubError> {
        let mut inner = self.lock();
        let Some(session) = inner.sessions.get(&id) else {
            return Err(HubError::NoSession);
        };
        let creator = session.username.clone();

        inner.buffers.entry(room_id.to_owned()).or_insert_with(|| {
            VecDeque::from([Message::system(
                &format!("system-{room_id}"),
                &format!("Welcome to {room_name}! This room was just created."),
            )])
        });

        let _ = self.global_tx.send(Outbound::from_origin(
            id,
            ServerEvent::RoomCreated {
                room_id: room_id.to_owned(),
                room_name: room_name.to_owned(),
                creator,
            },
        ));
        Ok(())
    }

    /// Drops a non-default room and relocates every member session to
    /// `general`. The members' sockets observe the global `room-deleted`
    /// and re-subscribe themselves (see the gateway loop).
    pub fn delete_room(&self, id: Uuid, room_id: &str) -> Result<(), HubError> {
        let mut inner = self.lock();
        let Some(session) = inner.sessions.get(&id) else {
            return Err(HubError::NoSession);
        };
        if DEFAULT_ROOMS.contains(&room_id) {
            return Err(HubError::DefaultRoomProtected);
        }
        let deleted_by = session.username.clone();

        inner.buffers.remove(room_id);
        for session in inner.sessions.values_mut() {
            if session.room == room_id {
                session.room = FALLBACK_ROOM.to_owned();
            }
        }

        let _ = self.global_tx.send(Outbound::from_origin(
            id,
            ServerEvent::RoomDeleted {
                room_id: room_id.to_owned(),
                deleted_by,
            },
        ));
        inner.users_updated(FALLBACK_ROOM);
        Ok(())
    }

    /// Tears the session down and notifies its room.
    pub fn disconnect(&self, id: Uuid) {
        let mut inner = self.lock();
        let Some(session) = inner.sessions.remove(&id) else {
            return;
        };
        let SessionInfo { username, room } = session;

        inner.send_to(
            &room,
            Outbound::to_others(
                id,
                ServerEvent::UserLeft {
                    username: username.clone(),
                    message: format!("{username} left the chat"),
                    time: clock_now(),
                },
            ),
        );
        inner.users_updated(&room);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HubInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
