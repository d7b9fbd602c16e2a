//! Periodic coordinator traffic: presence beacons, liveness probes, and the
//! online/offline status pixels.
use super::*;
use bzr_core::Address;
use bzr_core::Index;
use bzr_feedback::Rgb;
use bzr_feedback::Target;
use bzr_protocol::Message;
use std::collections::HashMap;
use std::convert::Infallible;
use std::time::Duration;
use tokio::time::Instant;
use tokio::time::Interval;
use tokio::time::MissedTickBehavior;

fn every(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Announces the coordinator's address and epoch to everyone in range.
pub(crate) async fn broadcast(context: Context) -> anyhow::Result<Infallible> {
    let ref announce = Message::announce(context.epoch, context.radio.address());
    let mut interval = every(context.config.broadcast_period);
    loop {
        interval.tick().await;
        context.send(Address::BROADCAST, announce).await;
        context.feedback.blink(Target::Beacon, Rgb::PURPLE, 1);
    }
}

/// Probes every registered player; their pongs keep them online.
pub(crate) async fn ping(context: Context) -> anyhow::Result<Infallible> {
    let mut interval = every(context.config.ping_period);
    interval.tick().await;
    loop {
        interval.tick().await;
        let addresses = context
            .directory
            .lock()
            .await
            .players()
            .iter()
            .map(Player::address)
            .collect::<Vec<_>>();
        log::debug!("[scheduler] pinging {} player(s)", addresses.len());
        context.feedback.blink(Target::Beacon, Rgb::CYAN, 1);
        for address in addresses {
            context.send(address, &Message::Ping).await;
        }
    }
}

/// Mirrors each player's online flag on its status pixel.
/// Only transitions are painted; the enabled flag is never touched.
pub(crate) async fn status(context: Context) -> anyhow::Result<Infallible> {
    let mut shown = HashMap::<Index, bool>::new();
    let mut interval = every(context.config.status_period);
    loop {
        interval.tick().await;
        let now = Instant::now();
        let players = context
            .directory
            .lock()
            .await
            .players()
            .iter()
            .map(|p| (p.index(), p.color().rgb(), p.is_online(now)))
            .collect::<Vec<_>>();
        for (index, color, online) in players {
            if shown.insert(index, online) == Some(online) {
                continue;
            }
            log::info!(
                "[scheduler] P{} {}",
                index,
                if online { "online" } else { "offline" }
            );
            let color = if online { color } else { Rgb::OFF };
            context.feedback.paint(Target::Player(index), color);
        }
    }
}
