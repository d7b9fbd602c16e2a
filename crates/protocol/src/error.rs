/// Errors that can occur during protocol operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Not JSON, not an object, or a required field is missing or ill-typed.
    Malformed(String),
    /// Well-formed frame whose action is outside the vocabulary.
    UnknownAction(String),
    /// A value could not be serialized.
    Encode(String),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(s) => write!(f, "malformed payload: {}", s),
            Self::UnknownAction(s) => write!(f, "unknown action: {}", s),
            Self::Encode(s) => write!(f, "cannot encode: {}", s),
        }
    }
}

impl std::error::Error for ProtocolError {}
