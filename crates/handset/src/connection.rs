use super::*;
use bzr_core::Address;
use bzr_core::Epoch;
use bzr_feedback::Rgb;
use bzr_protocol::Message;
use tokio::time::Instant;

/// Where a handset stands with its coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Waiting for an announce.
    Startup,
    /// Registration requested; waiting for the ack.
    RegistrationSent,
    /// Registered and armed.
    Enabled,
    /// Registered; presses are not reported.
    Disabled,
    /// Press reported; edges are ignored until the settle window ends.
    Pressed,
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Startup => write!(f, "startup"),
            Self::RegistrationSent => write!(f, "registration sent"),
            Self::Enabled => write!(f, "enabled"),
            Self::Disabled => write!(f, "disabled"),
            Self::Pressed => write!(f, "pressed"),
        }
    }
}

/// A message the runtime must transmit.
/// The destination must be in the radio's peer table before sending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub to: Address,
    pub message: Message,
}

/// Handset connection state machine.
///
/// Performs no I/O and reads no clock: every input carries the current
/// instant, and every transition that must be announced returns an
/// [`Outbound`]. Unknown or out-of-place inputs leave the state untouched.
#[derive(Debug)]
pub struct Connection {
    name: String,
    state: State,
    coordinator: Option<Address>,
    epoch: Option<Epoch>,
    timer: Timer,
    low: bool,
}

impl Connection {
    pub fn new(name: &str, config: TimerConfig) -> Self {
        Self {
            name: fit(name),
            state: State::Startup,
            coordinator: None,
            epoch: None,
            timer: Timer::new(config),
            low: false,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn state(&self) -> State {
        self.state
    }
    pub fn coordinator(&self) -> Option<Address> {
        self.coordinator
    }
    pub fn epoch(&self) -> Option<Epoch> {
        self.epoch
    }
    /// The button lamp is lit only while a press would count.
    pub fn lamp(&self) -> bool {
        self.state == State::Enabled
    }
    pub fn status_color(&self) -> Rgb {
        match self.state {
            State::Startup => Rgb::RED,
            State::RegistrationSent => Rgb::PURPLE,
            _ => Rgb::GREEN,
        }
    }

    /// Feeds one decoded frame.
    pub fn receive(&mut self, from: Address, message: Message, now: Instant) -> Option<Outbound> {
        if let Message::Announce {
            epoch,
            coordinator_address,
        } = message
        {
            return self.announce(epoch, coordinator_address, now);
        }
        if self.coordinator != Some(from) {
            log::debug!("[connection] ignoring {} from stranger {}", message, from);
            return None;
        }
        match (self.state, message) {
            (State::RegistrationSent, Message::RegistrationAck) => {
                log::info!("[connection] registered with {}", from);
                self.timer.clear();
                self.enter(State::Enabled);
                None
            }
            (state, Message::Ping) if state != State::Startup => Some(Outbound {
                to: from,
                message: Message::Pong,
            }),
            (State::Disabled, Message::Enable) => {
                self.enter(State::Enabled);
                None
            }
            (State::Enabled | State::Pressed, Message::Disable) => {
                self.timer.clear();
                self.enter(State::Disabled);
                None
            }
            (state, message) => {
                log::debug!("[connection] {} ignored while {}", message, state);
                None
            }
        }
    }

    /// Feeds one button sample. A press is a high-to-low transition.
    pub fn sample(&mut self, low: bool, now: Instant) -> Option<Outbound> {
        let edge = low && !self.low;
        self.low = low;
        if !edge {
            return None;
        }
        match (self.state, self.coordinator) {
            (State::Enabled, Some(to)) => {
                log::info!("[connection] pressed");
                self.timer.start_debounce(now);
                self.enter(State::Pressed);
                Some(Outbound {
                    to,
                    message: Message::Pressed,
                })
            }
            (state, _) => {
                log::debug!("[connection] press ignored while {}", state);
                None
            }
        }
    }

    /// Expires the pending deadline, if due.
    pub fn tick(&mut self, now: Instant) {
        if !self.timer.expired(now) {
            return;
        }
        self.timer.clear();
        match self.state {
            State::RegistrationSent => {
                log::warn!("[connection] no registration ack, starting over");
                self.coordinator = None;
                self.enter(State::Startup);
            }
            State::Pressed => self.enter(State::Enabled),
            _ => {}
        }
    }

    fn announce(&mut self, epoch: Epoch, coordinator: Address, now: Instant) -> Option<Outbound> {
        if self.epoch.is_some_and(|known| known != epoch) {
            log::info!("[connection] coordinator restarted with epoch {}", epoch);
            self.timer.clear();
            self.coordinator = None;
            self.enter(State::Startup);
        }
        self.epoch = Some(epoch);
        if self.state != State::Startup {
            return None;
        }
        self.coordinator = Some(coordinator);
        self.timer.start_registration(now);
        self.enter(State::RegistrationSent);
        Some(Outbound {
            to: coordinator,
            message: Message::request_registration(&self.name),
        })
    }

    fn enter(&mut self, state: State) {
        if self.state != state {
            log::debug!("[connection] {} -> {}", self.state, state);
            self.state = state;
        }
    }
}

/// Longest display name, in chars. Even fully escaped it keeps a
/// registration request inside one radio frame.
pub const MAX_NAME: usize = 32;

pub(crate) fn fit(name: &str) -> String {
    match name.char_indices().nth(MAX_NAME) {
        Some((cut, _)) => {
            log::warn!("[connection] name truncated to {} chars", MAX_NAME);
            name[..cut].to_string()
        }
        None => name.to_string(),
    }
}
