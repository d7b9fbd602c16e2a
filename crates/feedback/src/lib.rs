//! Visual feedback for the buzzer game.
//!
//! Protocol handlers never animate LEDs themselves. They enqueue a [`Request`]
//! through a cloneable [`Feedback`] handle and move on; a single
//! [`Sequencer`] task drains the queue in order, blinking and restoring
//! pixels on a shared [`Pixels`] strip.
mod color;
mod layout;
mod pixels;
mod sequencer;

pub use color::*;
pub use layout::*;
pub use pixels::*;
pub use sequencer::*;
