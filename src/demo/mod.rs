//! Demo-mode chat client: screen state machine, local fixtures, and the
//! explicit transport link that stands in for a socket.

pub mod controller;
pub mod fixtures;
pub mod transport;

pub use controller::{ChatController, Screen};
