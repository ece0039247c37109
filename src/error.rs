//! Domain errors for the realtime hub.
//!
//! Every variant's display string is the exact message sent to the client
//! in an `error` event; the protocol carries no error codes.

use thiserror::Error;

use crate::validate::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HubError {
    /// The socket never completed `user-join`. Dropped silently, never
    /// reported to the caller.
    #[error("no active session")]
    NoSession,
    #[error("Username already taken. Please choose another.")]
    UsernameTaken,
    #[error("Cannot delete default rooms")]
    DefaultRoomProtected,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}
