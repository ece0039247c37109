//! The demo-mode chat client: a screen-switching state machine over local
//! fixtures. Its rooms/messages/user are private, non-authoritative
//! mirrors, reset on logout.
//!
//! Sends are optimistic local echo: state is updated before the transport
//! round-trip and never reconciled if that round-trip fails.

use time::OffsetDateTime;

use crate::{format, validate};

use super::transport::Link;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Dashboard,
    ChatRoom,
    Settings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoUser {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoRoom {
    pub id: String,
    pub name: String,
    pub participant_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoMessage {
    pub id: String,
    pub room_id: String,
    pub user_id: String,
    pub username: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DemoRequest {
    SignIn { username: String },
    SendMessage { room_id: String, content: String },
    CreateRoom { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DemoReply {
    SignedIn { user: DemoUser },
    Ack,
}

pub struct ChatController {
    link: Link<DemoRequest, DemoReply>,
    screen: Screen,
    user: Option<DemoUser>,
    rooms: Vec<DemoRoom>,
    current_room: Option<String>,
    messages: Vec<DemoMessage>,
    dark_mode: bool,
}

impl ChatController {
    pub fn new(link: Link<DemoRequest, DemoReply>) -> Self {
        Self {
            link,
            screen: Screen::Login,
            user: None,
            rooms: super::fixtures::demo_rooms(),
            current_room: None,
            messages: Vec::new(),
            dark_mode: false,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn user(&self) -> Option<&DemoUser> {
        self.user.as_ref()
    }

    pub fn rooms(&self) -> &[DemoRoom] {
        &self.rooms
    }

    pub fn current_room(&self) -> Option<&str> {
        self.current_room.as_deref()
    }

    pub fn messages(&self) -> &[DemoMessage] {
        &self.messages
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub async fn login(&mut self, username: &str) -> Result<(), String> {
        let username = validate::username(username).map_err(|e| e.to_string())?;

        match self
            .link
            .request(DemoRequest::SignIn { username: username.to_owned() })
            .await
        {
            Ok(DemoReply::SignedIn { user }) => {
                self.user = Some(user);
                self.screen = Screen::Dashboard;
                Ok(())
            }
            _ => Err("Authentication failed. Please try again.".to_owned()),
        }
    }

    pub fn join_room(&mut self, room_id: &str) -> Result<(), String> {
        if !self.rooms.iter().any(|r| r.id == room_id) {
            return Err("Room not found".to_owned());
        }
        self.current_room = Some(room_id.to_owned());
        self.messages = super::fixtures::demo_messages(room_id);
        self.screen = Screen::ChatRoom;
        Ok(())
    }

    pub fn leave_room(&mut self) {
        self.current_room = None;
        self.messages.clear();
        self.screen = Screen::Dashboard;
    }

    /// Optimistic echo: the message lands in local state first; the
    /// round-trip result is ignored, failed or not.
    pub async fn send_message(&mut self, content: &str) -> Result<(), String> {
        let content = validate::message_content(content).map_err(|e| e.to_string())?;
        let Some(user) = self.user.clone() else {
            return Err("Please select a room first".to_owned());
        };
        let Some(room_id) = self.current_room.clone() else {
            return Err("Please select a room first".to_owned());
        };

        let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        self.messages.push(DemoMessage {
            id: format!("demo-msg-{millis}"),
            room_id: room_id.clone(),
            user_id: user.id,
            username: user.username,
            content: content.to_owned(),
        });

        let _ = self
            .link
            .request(DemoRequest::SendMessage {
                room_id,
                content: content.to_owned(),
            })
            .await;
        Ok(())
    }

    pub async fn create_room(&mut self, name: &str) -> Result<(), String> {
        let name = validate::room_name(name).map_err(|e| e.to_string())?;
        let duplicate = self.rooms.iter().any(|r| {
            r.name
                .strip_suffix(" (Demo)")
                .unwrap_or(&r.name)
                .eq_ignore_ascii_case(name)
        });
        if duplicate {
            return Err("Room name already exists".to_owned());
        }

        let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        self.rooms.push(DemoRoom {
            id: format!("demo-{millis}"),
            name: format!("{name} (Demo)"),
            participant_count: 1,
        });

        let _ = self
            .link
            .request(DemoRequest::CreateRoom { name: name.to_owned() })
            .await;
        Ok(())
    }

    pub fn open_settings(&mut self) {
        self.screen = Screen::Settings;
    }

    pub fn close_settings(&mut self) {
        self.screen = Screen::Dashboard;
    }

    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
    }

    /// Current room's messages rendered through the shared markup rules.
    pub fn rendered_messages(&self) -> Vec<String> {
        self.messages
            .iter()
            .map(|m| format::message_html(&m.content))
            .collect()
    }

    pub fn logout(&mut self) {
        self.user = None;
        self.current_room = None;
        self.messages.clear();
        self.rooms = super::fixtures::demo_rooms();
        self.screen = Screen::Login;
    }
}
