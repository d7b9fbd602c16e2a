//! Wire formats of the buzzer game.
//!
//! Two channels carry structured text:
//!
//! - The radio link, where every frame is one JSON object tagged by its
//!   `action` ([`Message`], encoded and decoded by [`Protocol`]).
//! - The operator console, a line-delimited JSON stream with
//!   enable/disable [`Command`]s coming in and one [`Buzz`] line going out
//!   per honored press.
//!
//! Decoding never panics. Malformed input and actions outside the vocabulary
//! surface as distinct [`ProtocolError`]s so callers can log and drop them.
mod console;
mod error;
mod message;
mod protocol;

pub use console::*;
pub use error::*;
pub use message::*;
pub use protocol::*;
