use bzr_core::Address;
use bzr_core::Epoch;
use serde::Deserialize;
use serde::Serialize;

/// Messages exchanged over the radio link.
/// Each serializes as one JSON object whose `action` field names the variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Message {
    /// Coordinator presence beacon, broadcast periodically.
    Announce {
        epoch: Epoch,
        coordinator_address: Address,
    },
    /// Handset asks to join under a display name.
    RequestRegistration { name: String },
    /// Coordinator confirms a registration.
    RegistrationAck,
    /// Coordinator liveness probe.
    Ping,
    /// Handset liveness reply.
    Pong,
    /// Handset reports a buzzer press.
    Pressed,
    /// Coordinator arms a handset's button.
    Enable,
    /// Coordinator disarms a handset's button.
    Disable,
}

impl Message {
    /// Every action name the protocol understands.
    pub const ACTIONS: [&'static str; 8] = [
        "announce",
        "request_registration",
        "registration_ack",
        "ping",
        "pong",
        "pressed",
        "enable",
        "disable",
    ];

    pub fn announce(epoch: Epoch, coordinator_address: Address) -> Self {
        Self::Announce {
            epoch,
            coordinator_address,
        }
    }
    pub fn request_registration(name: &str) -> Self {
        Self::RequestRegistration {
            name: name.to_string(),
        }
    }
    /// Wire name of this message's action.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Announce { .. } => "announce",
            Self::RequestRegistration { .. } => "request_registration",
            Self::RegistrationAck => "registration_ack",
            Self::Ping => "ping",
            Self::Pong => "pong",
            Self::Pressed => "pressed",
            Self::Enable => "enable",
            Self::Disable => "disable",
        }
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Announce {
                epoch,
                coordinator_address,
            } => write!(f, "announce {} from {}", epoch, coordinator_address),
            Self::RequestRegistration { name } => write!(f, "request_registration {:?}", name),
            other => write!(f, "{}", other.action()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn action_names_match_vocabulary() {
        let all = [
            Message::announce(Epoch::new(1), Address::BROADCAST),
            Message::request_registration("Red"),
            Message::RegistrationAck,
            Message::Ping,
            Message::Pong,
            Message::Pressed,
            Message::Enable,
            Message::Disable,
        ];
        let names = all.iter().map(Message::action).collect::<Vec<_>>();
        assert_eq!(names, Message::ACTIONS);
    }
}
