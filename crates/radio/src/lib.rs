//! Connectionless, point-to-multipoint radio transport.
//!
//! The game runs over a link in the style of ESP-NOW: stations are addressed
//! by a six-byte hardware address, frames are small opaque byte payloads, there
//! is no delivery guarantee, and unicast requires the destination to be in the
//! sender's peer table first.
//!
//! ## Core Types
//!
//! - [`Radio`]: The transport contract the coordinator and handsets are written against
//! - [`Frame`]: A received payload tagged with its sender
//! - [`RadioError`]: Send and receive failures
//! - [`Ether`]: In-memory medium shared by simulated stations
//! - [`Station`]: One endpoint attached to an [`Ether`]
mod ether;
mod radio;

pub use ether::*;
pub use radio::*;
