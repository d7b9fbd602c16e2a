//! Core type aliases, traits, and constants for the buzzer game.
//!
//! This crate provides the foundational types and timing parameters shared by
//! the coordinator and the handsets, plus the seams through which they reach
//! hardware (buttons, lamps) and the supervisor that runs their loops.
mod address;
mod pins;
mod tasks;

pub use address::*;
pub use pins::*;
pub use tasks::*;

use std::time::Duration;

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Player index assigned by the coordinator at first registration.
pub type Index = usize;

// ============================================================================
// TRAITS
// ============================================================================
/// Random instance generation for simulation and testing.
pub trait Arbitrary {
    /// Generate a uniformly random instance.
    fn random() -> Self;
}

// ============================================================================
// SESSION TIMING
// Wall-clock budgets shared by both ends of the radio link.
// ============================================================================
/// A player is shown online while its last heartbeat is younger than this.
pub const ONLINE_TIMEOUT: Duration = Duration::from_secs(10);
/// Handset gives up on a registration request after this long without an ack.
pub const REGISTRATION_TIMEOUT: Duration = Duration::from_secs(10);
/// Settle window after a reported press during which further edges are ignored.
pub const DEBOUNCE: Duration = Duration::from_millis(100);

// ============================================================================
// COORDINATOR CADENCE
// ============================================================================
/// Interval between announce broadcasts.
pub const BROADCAST_PERIOD: Duration = Duration::from_secs(4);
/// Interval between ping rounds.
pub const PING_PERIOD: Duration = Duration::from_secs(6);
/// Interval between online/offline re-evaluations for the status pixels.
pub const STATUS_PERIOD: Duration = Duration::from_millis(100);
/// Sampling interval of the coordinator's enable-all / disable-all buttons.
pub const PANEL_POLL: Duration = Duration::from_millis(100);
/// Quiet period after a panel button has been acted upon.
pub const PANEL_HOLDOFF: Duration = Duration::from_millis(500);

// ============================================================================
// FEEDBACK
// ============================================================================
/// Duration of each on and each off phase of a blink.
pub const BLINK_PHASE: Duration = Duration::from_millis(500);
/// Number of pixels on the coordinator's LED bar.
pub const BAR_LENGTH: usize = 6;

// ============================================================================
// HANDSET CADENCE
// ============================================================================
/// Button and deadline polling interval; well below the debounce window.
pub const HANDSET_POLL: Duration = Duration::from_millis(1);
/// Phase of the handset status pixel blink.
pub const HANDSET_BLINK: Duration = Duration::from_millis(200);

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "server")]
pub fn log() -> anyhow::Result<()> {
    std::fs::create_dir_all("logs")?;
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)?
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time))?,
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file])?;
    Ok(())
}

/// Loop that fails on Ctrl-C, so an interrupt takes the same shutdown path
/// as any other fatal error.
#[cfg(feature = "server")]
pub async fn interrupted() -> anyhow::Result<std::convert::Infallible> {
    tokio::signal::ctrl_c().await?;
    log::warn!("interrupt received");
    anyhow::bail!("interrupted")
}
