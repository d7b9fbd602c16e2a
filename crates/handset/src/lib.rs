//! Handset side of the buzzer game.
//!
//! [`Connection`] is the pure state machine: it consumes decoded messages,
//! button samples and the passage of time, and answers with the
//! [`Outbound`] message to transmit, if any. [`Handset`] wires it to a radio,
//! a button, a lamp and a status pixel.
mod config;
mod connection;
mod handset;
mod timer;

pub use config::*;
pub use connection::*;
pub use handset::*;
pub use timer::*;
