use bzr_core::Address;
use bzr_core::Index;
use bzr_core::ONLINE_TIMEOUT;
use bzr_feedback::Rgb;
use tokio::time::Instant;

/// Presentation color derived from a player's display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerColor {
    Red,
    Green,
    Blue,
    Yellow,
    /// Any name outside the known palette.
    White,
}

impl From<&str> for PlayerColor {
    fn from(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "RED" => Self::Red,
            "GREEN" => Self::Green,
            "BLUE" => Self::Blue,
            "YELLOW" => Self::Yellow,
            _ => Self::White,
        }
    }
}

impl PlayerColor {
    pub fn rgb(&self) -> Rgb {
        match self {
            Self::Red => Rgb::RED,
            Self::Green => Rgb::GREEN,
            Self::Blue => Rgb::BLUE,
            Self::Yellow => Rgb::YELLOW,
            Self::White => Rgb::WHITE,
        }
    }
}

/// One registered handset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub(crate) address: Address,
    pub(crate) name: String,
    pub(crate) index: Index,
    pub(crate) last_seen: Instant,
    pub(crate) last_press: Option<Instant>,
    pub(crate) enabled: bool,
}

impl Player {
    pub(crate) fn new(address: Address, name: &str, index: Index, now: Instant) -> Self {
        Self {
            address,
            name: name.to_string(),
            index,
            last_seen: now,
            last_press: None,
            enabled: true,
        }
    }
    pub fn address(&self) -> Address {
        self.address
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn index(&self) -> Index {
        self.index
    }
    pub fn color(&self) -> PlayerColor {
        PlayerColor::from(self.name.as_str())
    }
    pub fn last_seen(&self) -> Instant {
        self.last_seen
    }
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
    /// Online while the last heartbeat is strictly younger than the timeout.
    pub fn is_online(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_seen) < ONLINE_TIMEOUT
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "P{} {} ({}, {})",
            self.index,
            self.name,
            self.address,
            if self.enabled { "enabled" } else { "disabled" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    #[test]
    fn colors_from_names() {
        assert_eq!(PlayerColor::from("Red"), PlayerColor::Red);
        assert_eq!(PlayerColor::from("green"), PlayerColor::Green);
        assert_eq!(PlayerColor::from(" BLUE "), PlayerColor::Blue);
        assert_eq!(PlayerColor::from("yElLoW"), PlayerColor::Yellow);
        assert_eq!(PlayerColor::from("Magenta"), PlayerColor::White);
        assert_eq!(PlayerColor::from("").rgb(), Rgb::WHITE);
    }
    #[test]
    fn online_boundary_is_strict() {
        let t0 = Instant::now();
        let player = Player::new(Address::BROADCAST, "Red", 0, t0);
        assert!(player.is_online(t0));
        assert!(player.is_online(t0 + ONLINE_TIMEOUT - Duration::from_millis(1)));
        assert!(!player.is_online(t0 + ONLINE_TIMEOUT));
    }
}
