use super::*;
use bzr_core::HANDSET_BLINK;
use bzr_core::HANDSET_POLL;
use std::time::Duration;

/// Identity and cadence of a handset.
#[derive(Debug, Clone)]
pub struct HandsetConfig {
    /// Display name sent with every registration; also picks the player color.
    pub name: String,
    pub timer: TimerConfig,
    /// Button and deadline sampling interval.
    pub poll: Duration,
    /// Phase of the status pixel blink.
    pub blink: Duration,
}

impl HandsetConfig {
    pub fn named(name: &str) -> Self {
        Self {
            name: crate::connection::fit(name),
            ..Self::default()
        }
    }
}

impl Default for HandsetConfig {
    fn default() -> Self {
        Self {
            name: String::from("White"),
            timer: TimerConfig::default(),
            poll: HANDSET_POLL,
            blink: HANDSET_BLINK,
        }
    }
}
