use bzr_core::BAR_LENGTH;
use bzr_core::Index;

/// What a feedback request lights up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// Status pixel of one player.
    Player(Index),
    /// Announce / ping indicator.
    Beacon,
    /// Press indicator.
    Buzz,
    /// Every pixel on the strip.
    All,
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Player(i) => write!(f, "player {}", i),
            Self::Beacon => write!(f, "beacon"),
            Self::Buzz => write!(f, "buzz"),
            Self::All => write!(f, "all"),
        }
    }
}

/// Pixel positions of each target on the strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub buzz: usize,
    pub beacon: usize,
    /// Player status pixels, by player index.
    pub players: Vec<usize>,
    pub length: usize,
}

impl Default for Layout {
    /// Six-pixel bar: press indicator, beacon, then players from the far end.
    fn default() -> Self {
        Self {
            buzz: 0,
            beacon: 1,
            players: vec![5, 4, 3, 2],
            length: BAR_LENGTH,
        }
    }
}

impl Layout {
    /// Positions covered by a target. Empty if the target has no pixel.
    pub fn positions(&self, target: Target) -> Vec<usize> {
        match target {
            Target::Player(i) => self.players.get(i).copied().into_iter().collect(),
            Target::Beacon => vec![self.beacon],
            Target::Buzz => vec![self.buzz],
            Target::All => (0..self.length).collect(),
        }
    }
    /// Player whose status pixel sits at a position, if any.
    pub fn owner(&self, position: usize) -> Option<Index> {
        self.players.iter().position(|&p| p == position)
    }
}
