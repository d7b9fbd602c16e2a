use super::Arbitrary;
use serde::Deserialize;
use serde::Serialize;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

/// Six-byte hardware address of a radio station.
/// Text form is lowercase, colon-separated hex: `aa:bb:cc:dd:ee:ff`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; 6]);

impl Address {
    /// Reserved all-ones address; frames sent here reach every station.
    pub const BROADCAST: Self = Self([0xff; 6]);

    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }
}

impl Arbitrary for Address {
    /// Random unicast, locally administered address.
    fn random() -> Self {
        let mut bytes = rand::random::<[u8; 6]>();
        bytes[0] = (bytes[0] & 0xfc) | 0x02;
        Self(bytes)
    }
}

/// Errors that can occur while parsing an [`Address`] from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    Length(usize),
    Octet(String),
}

impl Display for AddressError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Length(n) => write!(f, "expected 6 octets, found {}", n),
            Self::Octet(s) => write!(f, "invalid octet: {:?}", s),
        }
    }
}

impl std::error::Error for AddressError {}

impl FromStr for Address {
    type Err = AddressError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let octets = s.trim().split(':').collect::<Vec<_>>();
        if octets.len() != 6 {
            return Err(AddressError::Length(octets.len()));
        }
        let mut bytes = [0u8; 6];
        for (byte, octet) in bytes.iter_mut().zip(octets) {
            *byte = (octet.len() == 2 && octet.bytes().all(|b| b.is_ascii_hexdigit()))
                .then(|| u8::from_str_radix(octet, 16).ok())
                .flatten()
                .ok_or_else(|| AddressError::Octet(octet.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            a, b, c, d, e, g
        )
    }
}

impl Debug for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Address").field(&self.to_string()).finish()
    }
}

/// Identifier of one coordinator boot.
/// A handset that sees a different epoch knows the coordinator restarted.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Epoch(u64);

impl Epoch {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl Arbitrary for Epoch {
    fn random() -> Self {
        Self(rand::random())
    }
}

impl Display for Epoch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
