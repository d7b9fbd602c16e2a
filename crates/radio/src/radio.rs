use bzr_core::Address;

/// Largest payload a single frame may carry.
pub const MAX_PAYLOAD: usize = 250;

/// A payload received from another station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub from: Address,
    pub payload: Vec<u8>,
}

/// Errors that can occur on the radio link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioError {
    /// Unicast to an address missing from the peer table.
    UnknownPeer(Address),
    /// Payload larger than [`MAX_PAYLOAD`].
    Oversize(usize),
    /// The session was released or the medium went away.
    Closed,
}

impl std::fmt::Display for RadioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownPeer(a) => write!(f, "unknown peer: {}", a),
            Self::Oversize(n) => write!(f, "payload of {} bytes exceeds {}", n, MAX_PAYLOAD),
            Self::Closed => write!(f, "radio session closed"),
        }
    }
}

impl std::error::Error for RadioError {}

/// Radio session owned by one device.
///
/// Sends are fire-and-forget: `Ok` means the frame left this station, not
/// that anyone heard it. Implementations must be usable from several loops at
/// once, hence `&self` everywhere.
#[async_trait::async_trait]
pub trait Radio: Send + Sync {
    /// This station's own hardware address.
    fn address(&self) -> Address;
    /// Adds an address to the peer table. Idempotent.
    fn ensure_peer(&self, peer: Address);
    /// Transmits one frame to a peer or to [`Address::BROADCAST`].
    async fn send(&self, to: Address, payload: &[u8]) -> Result<(), RadioError>;
    /// Waits for the next frame addressed to this station.
    async fn recv(&self) -> Result<Frame, RadioError>;
    /// Releases the session. Subsequent sends fail and pending receives end.
    fn close(&self);
}
