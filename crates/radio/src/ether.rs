use super::*;
use bzr_core::Address;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;

/// Shared state of the simulated airwaves.
#[derive(Debug)]
struct Air {
    stations: HashMap<Address, (u64, UnboundedSender<Frame>)>,
    tickets: u64,
    loss: f64,
    rng: SmallRng,
}

impl Air {
    fn lost(&mut self) -> bool {
        self.loss > 0.0 && self.rng.random_bool(self.loss)
    }
}

/// In-memory broadcast medium.
///
/// Stations that [`join`](Self::join) the same ether hear each other's
/// broadcasts and can unicast to one another. Frames to an address nobody
/// holds vanish, and with a non-zero loss probability any frame may vanish.
#[derive(Debug, Clone)]
pub struct Ether {
    air: Arc<Mutex<Air>>,
}

impl Default for Ether {
    fn default() -> Self {
        Self::lossy(0.0)
    }
}

impl Ether {
    pub fn new() -> Self {
        Self::default()
    }
    /// Medium that drops each delivery with the given probability.
    pub fn lossy(loss: f64) -> Self {
        Self {
            air: Arc::new(Mutex::new(Air {
                stations: HashMap::new(),
                tickets: 0,
                loss: loss.clamp(0.0, 1.0),
                rng: SmallRng::seed_from_u64(rand::random()),
            })),
        }
    }
    /// Attaches a station. Joining with an address already on the air
    /// replaces the old station, as a rebooted device would.
    pub fn join(&self, address: Address) -> Station {
        let (tx, rx) = unbounded_channel();
        let ref mut air = self.air();
        air.tickets += 1;
        let ticket = air.tickets;
        if air.stations.insert(address, (ticket, tx)).is_some() {
            log::debug!("[ether] {} rejoined", address);
        }
        Station {
            address,
            ticket,
            ether: self.clone(),
            inbox: tokio::sync::Mutex::new(rx),
            peers: Mutex::new(HashSet::new()),
            closed: AtomicBool::new(false),
        }
    }
    /// Number of stations currently on the air.
    pub fn stations(&self) -> usize {
        self.air().stations.len()
    }
    fn air(&self) -> std::sync::MutexGuard<'_, Air> {
        self.air.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
    fn leave(&self, address: Address, ticket: u64) {
        let ref mut air = self.air();
        if air.stations.get(&address).is_some_and(|(t, _)| *t == ticket) {
            air.stations.remove(&address);
        }
    }
    fn transmit(&self, from: Address, to: Address, payload: &[u8]) {
        let ref mut air = self.air();
        let targets = match to.is_broadcast() {
            true => air
                .stations
                .iter()
                .filter(|(a, _)| **a != from)
                .map(|(_, (_, tx))| tx.clone())
                .collect::<Vec<_>>(),
            false => air
                .stations
                .get(&to)
                .map(|(_, tx)| tx.clone())
                .into_iter()
                .collect(),
        };
        for tx in targets {
            if air.lost() {
                log::trace!("[ether] frame {} -> {} lost", from, to);
                continue;
            }
            let _ = tx.send(Frame {
                from,
                payload: payload.to_vec(),
            });
        }
    }
}

/// One endpoint on an [`Ether`].
#[derive(Debug)]
pub struct Station {
    address: Address,
    ticket: u64,
    ether: Ether,
    inbox: tokio::sync::Mutex<UnboundedReceiver<Frame>>,
    peers: Mutex<HashSet<Address>>,
    closed: AtomicBool,
}

impl Station {
    /// Whether the peer table holds the given address.
    pub fn knows(&self, peer: Address) -> bool {
        self.peers().contains(&peer)
    }
    fn peers(&self) -> std::sync::MutexGuard<'_, HashSet<Address>> {
        self.peers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait::async_trait]
impl Radio for Station {
    fn address(&self) -> Address {
        self.address
    }
    fn ensure_peer(&self, peer: Address) {
        if self.peers().insert(peer) {
            log::debug!("[radio {}] added peer {}", self.address, peer);
        }
    }
    async fn send(&self, to: Address, payload: &[u8]) -> Result<(), RadioError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(RadioError::Closed);
        }
        if payload.len() > MAX_PAYLOAD {
            return Err(RadioError::Oversize(payload.len()));
        }
        if !self.knows(to) {
            return Err(RadioError::UnknownPeer(to));
        }
        self.ether.transmit(self.address, to, payload);
        Ok(())
    }
    async fn recv(&self) -> Result<Frame, RadioError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(RadioError::Closed);
        }
        self.inbox.lock().await.recv().await.ok_or(RadioError::Closed)
    }
    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            log::debug!("[radio {}] session released", self.address);
            self.ether.leave(self.address, self.ticket);
        }
    }
}
