use super::*;
use bzr_core::Address;
use bzr_core::DEBOUNCE;
use bzr_core::Index;
use bzr_protocol::Selection;
use std::collections::HashMap;
use tokio::time::Instant;

/// Registry of every handset that has joined since the coordinator booted.
///
/// Indices are handed out in registration order and never reused. The
/// directory takes the current instant as an argument rather than reading a
/// clock, so liveness decisions are reproducible.
#[derive(Debug, Default)]
pub struct Directory {
    players: Vec<Player>,
    by_address: HashMap<Address, Index>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }
    /// Registers a handset, or refreshes it if already known.
    /// A known address keeps its index, name and enabled flag.
    pub fn register(&mut self, address: Address, name: &str, now: Instant) -> &Player {
        let index = match self.by_address.get(&address) {
            Some(&index) => {
                log::debug!("[directory] {} re-registered as P{}", address, index);
                index
            }
            None => {
                let index = self.players.len();
                self.players.push(Player::new(address, name, index, now));
                self.by_address.insert(address, index);
                log::info!("[directory] registered {} as P{} {}", address, index, name);
                index
            }
        };
        let player = &mut self.players[index];
        player.last_seen = now;
        player
    }
    pub fn lookup(&self, address: Address) -> Option<&Player> {
        self.by_address.get(&address).map(|&i| &self.players[i])
    }
    /// Refreshes a known player's liveness. Unknown senders change nothing.
    pub fn heartbeat(&mut self, address: Address, now: Instant) -> bool {
        match self.by_address.get(&address) {
            Some(&index) => {
                self.players[index].last_seen = now;
                true
            }
            None => {
                log::debug!("[directory] heartbeat from unknown {}", address);
                false
            }
        }
    }
    /// Records a press from a known player. A repeat within the debounce
    /// window is the same physical press delivered twice and returns false.
    pub fn press(&mut self, address: Address, now: Instant) -> bool {
        let Some(&index) = self.by_address.get(&address) else {
            return false;
        };
        let player = &mut self.players[index];
        if player
            .last_press
            .is_some_and(|t| now.saturating_duration_since(t) < DEBOUNCE)
        {
            return false;
        }
        player.last_press = Some(now);
        true
    }
    /// Enables the selected players; returns those that were disabled.
    pub fn enable(&mut self, selection: &Selection) -> Vec<Player> {
        self.toggle(selection, true)
    }
    /// Disables the selected players; returns those that were enabled.
    pub fn disable(&mut self, selection: &Selection) -> Vec<Player> {
        self.toggle(selection, false)
    }
    pub fn is_online(&self, player: &Player, now: Instant) -> bool {
        player.is_online(now)
    }
    pub fn players(&self) -> &[Player] {
        &self.players
    }
    pub fn get(&self, index: Index) -> Option<&Player> {
        self.players.get(index)
    }
    pub fn len(&self) -> usize {
        self.players.len()
    }
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
    /// Every registered index except one.
    pub fn others(&self, index: Index) -> Selection {
        Selection::Only((0..self.players.len()).filter(|&i| i != index).collect())
    }

    fn toggle(&mut self, selection: &Selection, enabled: bool) -> Vec<Player> {
        if let Selection::Only(set) = selection {
            for index in set.range(self.players.len()..) {
                log::warn!("[directory] no player at index {}", index);
            }
        }
        let mut changed = Vec::new();
        for player in self.players.iter_mut() {
            if selection.contains(player.index) && player.enabled != enabled {
                player.enabled = enabled;
                changed.push(player.clone());
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bzr_core::ONLINE_TIMEOUT;
    use std::collections::BTreeSet;
    use std::time::Duration;
    fn address(last: u8) -> Address {
        Address::new([0x02, 0, 0, 0, 0, last])
    }
    fn only(indices: &[Index]) -> Selection {
        Selection::Only(indices.iter().copied().collect::<BTreeSet<_>>())
    }
    fn indices(players: &[Player]) -> Vec<Index> {
        players.iter().map(Player::index).collect()
    }
    #[test]
    fn indices_follow_registration_order() {
        let now = Instant::now();
        let mut directory = Directory::new();
        let a = directory.register(address(1), "Red", now).index();
        let b = directory.register(address(2), "Blue", now).index();
        let c = directory.register(address(3), "Green", now).index();
        assert_eq!((a, b, c), (0, 1, 2));
        assert_eq!(directory.len(), 3);
    }
    #[test]
    fn register_is_idempotent() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(3);
        let mut directory = Directory::new();
        directory.register(address(1), "Red", t0);
        directory.disable(&only(&[0]));
        let again = directory.register(address(1), "Blue", t1).clone();
        assert_eq!(again.index(), 0);
        assert_eq!(again.name(), "Red");
        assert!(!again.is_enabled());
        assert_eq!(again.last_seen(), t1);
        assert_eq!(directory.len(), 1);
    }
    #[test]
    fn heartbeat_never_creates() {
        let now = Instant::now();
        let mut directory = Directory::new();
        assert!(!directory.heartbeat(address(9), now));
        assert!(directory.is_empty());
        assert!(directory.lookup(address(9)).is_none());
    }
    #[test]
    fn heartbeat_refreshes_liveness() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(8);
        let t2 = t0 + Duration::from_secs(12);
        let mut directory = Directory::new();
        directory.register(address(1), "Red", t0);
        assert!(directory.heartbeat(address(1), t1));
        let player = directory.lookup(address(1)).unwrap();
        assert!(directory.is_online(player, t2));
        assert!(!directory.is_online(player, t1 + ONLINE_TIMEOUT));
    }
    #[test]
    fn toggling_reports_only_changes() {
        let now = Instant::now();
        let mut directory = Directory::new();
        directory.register(address(1), "Red", now);
        directory.register(address(2), "Blue", now);
        assert!(directory.enable(&Selection::All).is_empty());
        assert_eq!(indices(&directory.disable(&only(&[1]))), vec![1]);
        assert!(directory.disable(&only(&[1])).is_empty());
        assert_eq!(indices(&directory.disable(&Selection::All)), vec![0]);
        assert_eq!(indices(&directory.enable(&Selection::All)), vec![0, 1]);
        assert!(directory.enable(&Selection::All).is_empty());
    }
    #[test]
    fn unknown_indices_are_skipped() {
        let now = Instant::now();
        let mut directory = Directory::new();
        directory.register(address(1), "Red", now);
        assert_eq!(indices(&directory.disable(&only(&[0, 5]))), vec![0]);
    }
    #[test]
    fn repeated_press_within_debounce_counts_once() {
        let now = Instant::now();
        let mut directory = Directory::new();
        directory.register(address(1), "Red", now);
        directory.register(address(2), "Blue", now);
        assert!(!directory.press(address(9), now));
        assert!(directory.press(address(1), now));
        assert!(!directory.press(address(1), now + Duration::from_millis(99)));
        assert!(directory.press(address(2), now + Duration::from_millis(99)));
        assert!(directory.press(address(1), now + DEBOUNCE));
    }
    #[test]
    fn others_excludes_exactly_one() {
        let now = Instant::now();
        let mut directory = Directory::new();
        for i in 0..4 {
            directory.register(address(i), "Red", now);
        }
        assert_eq!(directory.others(2), only(&[0, 1, 3]));
        let changed = directory.disable(&directory.others(2));
        assert_eq!(indices(&changed), vec![0, 1, 3]);
        assert!(directory.get(2).unwrap().is_enabled());
    }
}
