use bzr_core::*;
use bzr_feedback::Layout;
use std::time::Duration;

/// Cadence and layout of a coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub broadcast_period: Duration,
    pub ping_period: Duration,
    pub status_period: Duration,
    pub panel_poll: Duration,
    pub panel_holdoff: Duration,
    pub blink_phase: Duration,
    pub layout: Layout,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            broadcast_period: BROADCAST_PERIOD,
            ping_period: PING_PERIOD,
            status_period: STATUS_PERIOD,
            panel_poll: PANEL_POLL,
            panel_holdoff: PANEL_HOLDOFF,
            blink_phase: BLINK_PHASE,
            layout: Layout::default(),
        }
    }
}
