//! Coordinator side of the buzzer game.
//!
//! The [`Coordinator`] owns the [`Directory`] of registered players and
//! runs its loops under one supervisor:
//!
//! - **receive**: decodes radio frames and dispatches registrations,
//!   heartbeats and presses
//! - **console**: applies operator enable/disable commands
//! - **broadcast** / **ping** / **status**: the liveness scheduler
//! - **panel**: the enable-all / disable-all buttons
//! - **feedback**: the LED sequencer
//!
//! Every state change is mirrored on the LED bar through the feedback queue,
//! so no handler ever waits on an animation.
mod config;
mod coordinator;
mod directory;
mod panel;
mod player;
mod scheduler;

pub use config::*;
pub use coordinator::*;
pub use directory::*;
pub use panel::*;
pub use player::*;
