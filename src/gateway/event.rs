//! Wire events for the realtime gateway.
//!
//! Frames are JSON text of the form `{"event": <name>, "data": {...}}`,
//! with kebab-case event names and camelCase payload fields.

use serde::{Deserialize, Serialize};

use crate::hub::Message;

fn default_room() -> String {
    "general".to_owned()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    #[serde(rename_all = "camelCase")]
    UserJoin {
        username: String,
        #[serde(default = "default_room")]
        room: String,
    },
    #[serde(rename_all = "camelCase")]
    SendMessage { content: String, room: String },
    #[serde(rename_all = "camelCase")]
    SwitchRoom { new_room: String },
    #[serde(rename_all = "camelCase")]
    CreateRoom { room_id: String, room_name: String },
    #[serde(rename_all = "camelCase")]
    DeleteRoom { room_id: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    #[serde(rename_all = "camelCase")]
    JoinSuccess { username: String, room: String },
    #[serde(rename_all = "camelCase")]
    RoomMessages { room: String, messages: Vec<Message> },
    NewMessage(Message),
    #[serde(rename_all = "camelCase")]
    UserJoined {
        username: String,
        message: String,
        time: String,
    },
    #[serde(rename_all = "camelCase")]
    UserLeft {
        username: String,
        message: String,
        time: String,
    },
    #[serde(rename_all = "camelCase")]
    RoomUsersUpdated {
        room: String,
        users: Vec<String>,
        count: usize,
    },
    #[serde(rename_all = "camelCase")]
    RoomCreated {
        room_id: String,
        room_name: String,
        creator: String,
    },
    #[serde(rename_all = "camelCase")]
    RoomDeleted {
        room_id: String,
        deleted_by: String,
    },
    #[serde(rename_all = "camelCase")]
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_join_defaults_to_general() {
        let ev: ClientEvent =
            serde_json::from_str(r#"{"event":"user-join","data":{"username":"alice"}}"#).unwrap();
        assert_eq!(
            ev,
            ClientEvent::UserJoin {
                username: "alice".into(),
                room: "general".into()
            }
        );
    }

    #[test]
    fn client_events_use_camel_case_fields() {
        let ev: ClientEvent = serde_json::from_str(
            r#"{"event":"create-room","data":{"roomId":"dogs","roomName":"Dog Pics"}}"#,
        )
        .unwrap();
        assert_eq!(
            ev,
            ClientEvent::CreateRoom {
                room_id: "dogs".into(),
                room_name: "Dog Pics".into()
            }
        );

        let ev: ClientEvent =
            serde_json::from_str(r#"{"event":"switch-room","data":{"newRoom":"tech"}}"#).unwrap();
        assert_eq!(ev, ClientEvent::SwitchRoom { new_room: "tech".into() });
    }

    #[test]
    fn server_events_serialize_with_event_tag() {
        let json = serde_json::to_value(ServerEvent::RoomDeleted {
            room_id: "dogs".into(),
            deleted_by: "alice".into(),
        })
        .unwrap();
        assert_eq!(json["event"], "room-deleted");
        assert_eq!(json["data"]["roomId"], "dogs");
        assert_eq!(json["data"]["deletedBy"], "alice");
    }

    #[test]
    fn new_message_payload_is_the_message_object() {
        let msg = Message::system("system-1", "hi");
        let json = serde_json::to_value(ServerEvent::NewMessage(msg)).unwrap();
        assert_eq!(json["event"], "new-message");
        assert_eq!(json["data"]["author"], "System");
        assert_eq!(json["data"]["content"], "hi");
    }
}
