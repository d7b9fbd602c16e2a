use super::*;
use bzr_core::Index;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeSet;

/// Which players a console command addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Only(BTreeSet<Index>),
}

impl Selection {
    pub fn contains(&self, index: Index) -> bool {
        match self {
            Self::All => true,
            Self::Only(set) => set.contains(&index),
        }
    }
    /// Interprets raw console indices. `-1` anywhere selects every player;
    /// any other negative value is dropped.
    fn from_raw(raw: &[i64]) -> Self {
        if raw.contains(&-1) {
            return Self::All;
        }
        Self::Only(
            raw.iter()
                .filter(|&&i| {
                    let valid = i >= 0;
                    if !valid {
                        log::warn!("[console] ignoring player index {}", i);
                    }
                    valid
                })
                .map(|&i| i as Index)
                .collect(),
        )
    }
}

#[derive(Deserialize)]
struct RawCommand {
    enable: Option<Vec<i64>>,
    disable: Option<Vec<i64>>,
}

/// One operator instruction read from the console.
/// When both halves are present, `enable` applies before `disable`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub enable: Option<Selection>,
    pub disable: Option<Selection>,
}

impl Command {
    /// Parses one console line, e.g. `{"enable":[-1]}` or `{"disable":[0,2]}`.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let raw = serde_json::from_str::<RawCommand>(line.trim())
            .map_err(|e| ProtocolError::Malformed(e.to_string()))?;
        if raw.enable.is_none() && raw.disable.is_none() {
            return Err(ProtocolError::Malformed(
                "expected an enable or disable list".to_string(),
            ));
        }
        Ok(Self {
            enable: raw.enable.as_deref().map(Selection::from_raw),
            disable: raw.disable.as_deref().map(Selection::from_raw),
        })
    }
}

/// Console record emitted when a press is honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buzz {
    pub buzzer: Index,
}

impl Buzz {
    pub fn new(buzzer: Index) -> Self {
        Self { buzzer }
    }
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    fn only(indices: &[Index]) -> Option<Selection> {
        Some(Selection::Only(indices.iter().copied().collect()))
    }
    #[test]
    fn enable_all() {
        let command = Command::parse(r#"{"enable":[-1]}"#).unwrap();
        assert_eq!(command.enable, Some(Selection::All));
        assert_eq!(command.disable, None);
    }
    #[test]
    fn disable_some() {
        let command = Command::parse(r#"{"disable":[0,2]}"#).unwrap();
        assert_eq!(command.enable, None);
        assert_eq!(command.disable, only(&[0, 2]));
    }
    #[test]
    fn both_halves() {
        let command = Command::parse(r#" {"disable":[-1],"enable":[1]} "#).unwrap();
        assert_eq!(command.enable, only(&[1]));
        assert_eq!(command.disable, Some(Selection::All));
    }
    #[test]
    fn stray_negatives_dropped() {
        let command = Command::parse(r#"{"enable":[3,-7]}"#).unwrap();
        assert_eq!(command.enable, only(&[3]));
    }
    #[test]
    fn garbage_lines_rejected() {
        assert!(Command::parse("enable everyone").is_err());
        assert!(Command::parse("{}").is_err());
        assert!(Command::parse(r#"{"enable":"all"}"#).is_err());
        assert!(Command::parse("[1]").is_err());
    }
    #[test]
    fn selection_membership() {
        assert!(Selection::All.contains(9));
        assert!(only(&[1]).unwrap().contains(1));
        assert!(!only(&[1]).unwrap().contains(2));
    }
    #[test]
    fn buzz_line() {
        assert_eq!(Buzz::new(2).to_json().unwrap(), r#"{"buzzer":2}"#);
    }
}
