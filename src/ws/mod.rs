//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` streams [`crate::domain::PickerEvent`]s
//! to the browser renderer. Clients pick topics with a `subscribe`
//! command (`state` for snapshot changes, `draw` for wheel and spin
//! progress) and can fetch the full state with `get_state`.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
