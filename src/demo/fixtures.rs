//! Demo-mode fixtures: the canned rooms and messages every "network"
//! action is satisfied from. No backend is contacted in demo mode.

use super::controller::{DemoMessage, DemoReply, DemoRequest, DemoRoom, DemoUser};
use super::transport::{Link, LinkServer, link};

pub fn demo_rooms() -> Vec<DemoRoom> {
    vec![
        DemoRoom {
            id: "demo-1".to_owned(),
            name: "General (Demo)".to_owned(),
            participant_count: 12,
        },
        DemoRoom {
            id: "demo-2".to_owned(),
            name: "Tech Talk (Demo)".to_owned(),
            participant_count: 8,
        },
        DemoRoom {
            id: "demo-3".to_owned(),
            name: "Random (Demo)".to_owned(),
            participant_count: 5,
        },
    ]
}

pub fn demo_messages(room_id: &str) -> Vec<DemoMessage> {
    let seeded: &[(&str, &str, &str)] = match room_id {
        "demo-1" => &[
            ("demo-msg-1", "Alice", "Welcome to the demo chat! This is running in demo mode."),
            ("demo-msg-2", "Bob", "You can try sending messages, but they won't persist since we're in demo mode."),
        ],
        "demo-2" => &[("demo-msg-3", "Charlie", "This is the Tech Talk room in demo mode.")],
        "demo-3" => &[("demo-msg-4", "Diana", "Random discussions happen here!")],
        _ => &[],
    };

    seeded
        .iter()
        .enumerate()
        .map(|(n, (id, username, content))| DemoMessage {
            id: (*id).to_owned(),
            room_id: room_id.to_owned(),
            user_id: format!("demo-other-{}", n + 1),
            username: (*username).to_owned(),
            content: (*content).to_owned(),
        })
        .collect()
}

/// Answers every request locally, the whole point of demo mode.
pub fn answer(req: DemoRequest) -> DemoReply {
    match req {
        DemoRequest::SignIn { username } => DemoReply::SignedIn {
            user: DemoUser {
                id: "demo-user".to_owned(),
                username,
            },
        },
        DemoRequest::SendMessage { .. } | DemoRequest::CreateRoom { .. } => DemoReply::Ack,
    }
}

/// A ready-to-use demo link with the serving half answering from fixtures
/// on a background task.
pub fn spawn_backend() -> Link<DemoRequest, DemoReply> {
    let (client, server) = link();
    tokio::spawn(server.serve(answer));
    client
}

/// The paired halves, for tests that drive the serving side explicitly.
pub fn backend_pair() -> (
    Link<DemoRequest, DemoReply>,
    LinkServer<DemoRequest, DemoReply>,
) {
    link()
}
