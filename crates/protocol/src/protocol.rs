use super::*;
use serde::Deserialize;

/// Frame codec for the radio link.
///
/// Payloads are UTF-8 JSON objects. Fields beyond those an action needs are
/// ignored on decode, so newer peers can add them without breaking older ones.
pub struct Protocol;

/// Just enough structure to tell an unknown action from a broken frame.
#[derive(Deserialize)]
struct Envelope {
    action: String,
}

impl Protocol {
    /// Serialize a message into a radio payload.
    pub fn encode(message: &Message) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(message).map_err(|e| ProtocolError::Encode(e.to_string()))
    }
    /// Parse a radio payload into a message.
    pub fn decode(bytes: &[u8]) -> Result<Message, ProtocolError> {
        serde_json::from_slice::<Message>(bytes).map_err(|e| {
            match serde_json::from_slice::<Envelope>(bytes) {
                Ok(Envelope { action }) if !Message::ACTIONS.contains(&action.as_str()) => {
                    ProtocolError::UnknownAction(action)
                }
                _ => ProtocolError::Malformed(e.to_string()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bzr_core::Address;
    use bzr_core::Epoch;
    #[test]
    fn announce_wire_form() {
        let address = Address::new([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        let message = Message::announce(Epoch::new(7), address);
        let bytes = Protocol::encode(&message).unwrap();
        let value = serde_json::from_slice::<serde_json::Value>(&bytes).unwrap();
        assert_eq!(value["action"], "announce");
        assert_eq!(value["epoch"], 7);
        assert_eq!(value["coordinator_address"], "aa:bb:cc:dd:ee:ff");
        assert_eq!(Protocol::decode(&bytes), Ok(message));
    }
    #[test]
    fn unit_actions_carry_only_the_tag() {
        let bytes = Protocol::encode(&Message::Ping).unwrap();
        assert_eq!(bytes, br#"{"action":"ping"}"#);
        let bytes = Protocol::encode(&Message::RegistrationAck).unwrap();
        assert_eq!(bytes, br#"{"action":"registration_ack"}"#);
    }
    #[test]
    fn registration_carries_name() {
        let bytes = br#"{"action":"request_registration","name":"Blue"}"#;
        assert_eq!(
            Protocol::decode(bytes),
            Ok(Message::request_registration("Blue"))
        );
    }
    #[test]
    fn extra_fields_are_ignored() {
        let bytes = br#"{"action":"pressed","at":1234,"battery":"low"}"#;
        assert_eq!(Protocol::decode(bytes), Ok(Message::Pressed));
    }
    #[test]
    fn unknown_action_is_distinguished() {
        let bytes = br#"{"action":"self_destruct"}"#;
        assert_eq!(
            Protocol::decode(bytes),
            Err(ProtocolError::UnknownAction("self_destruct".to_string()))
        );
    }
    #[test]
    fn malformed_payloads() {
        assert!(matches!(
            Protocol::decode(b"not json"),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            Protocol::decode(b"[1,2,3]"),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            Protocol::decode(br#"{"name":"Red"}"#),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            Protocol::decode(br#"{"action":"request_registration"}"#),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            Protocol::decode(br#"{"action":"announce","epoch":1,"coordinator_address":"nope"}"#),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            Protocol::decode(&[0xff, 0xfe, 0x00]),
            Err(ProtocolError::Malformed(_))
        ));
    }
}
