//! This module defines the raw, unvalidated machine definition as it is read from a
//! definition document. Every field is optional at this level; the configuration
//! builder in [`crate::config`] reports anything that is missing or inconsistent.

use crate::one_or_many::OneOrMany;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A complete machine definition: alphabet, initial tape, and the state table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MachineDefinition {
    /// A human readable name for the machine.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub alphabet: AlphabetDefinition,
    #[serde(default)]
    pub tape: TapeDefinition,
    #[serde(default, rename = "state")]
    pub states: StateDefinition,
}

/// The declared symbols of the machine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlphabetDefinition {
    #[serde(default)]
    pub symbols: Vec<String>,
    #[serde(default)]
    pub blank: String,
    /// Symbols that may appear on the initial tape or be written by an action.
    #[serde(default)]
    pub input: Option<OneOrMany<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TapeDefinition {
    #[serde(default)]
    pub initial_tape: Vec<String>,
    #[serde(default)]
    pub initial_index: i64,
}

/// The state table together with its initial and halting states.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDefinition {
    #[serde(default)]
    pub initial: String,
    #[serde(default, rename = "final", alias = "halting")]
    pub halting: Option<OneOrMany<String>>,
    /// Whether actions may leave the head in place.
    #[serde(default)]
    pub null_move: bool,
    /// State name to its actions, keyed by the symbol read (or `blank` / `default`).
    #[serde(default)]
    pub states: BTreeMap<String, BTreeMap<String, ActionDefinition>>,
}

/// A single, possibly abbreviated, action. Omitted fields are filled in by the builder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write: Option<String>,
    #[serde(default, rename = "move", skip_serializing_if = "Option::is_none")]
    pub movement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<String>,
}

impl ActionDefinition {
    pub fn new(write: Option<&str>, movement: Option<&str>, transition: Option<&str>) -> Self {
        Self {
            write: write.map(str::to_string),
            movement: movement.map(str::to_string),
            transition: transition.map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_definition() {
        let json = r#"{
            "name": "Flip",
            "alphabet": { "symbols": ["0", "1"], "blank": "0", "input": ["0", "1"] },
            "tape": { "initial_tape": ["1", "blank"], "initial_index": 1 },
            "state": {
                "initial": "A",
                "final": "B",
                "null_move": true,
                "states": {
                    "A": { "1": { "write": "0", "move": "R", "transition": "B" } },
                    "B": {}
                }
            }
        }"#;

        let definition: MachineDefinition = serde_json::from_str(json).unwrap();

        assert_eq!(definition.name, "Flip");
        assert_eq!(definition.alphabet.blank, "0");
        assert_eq!(definition.tape.initial_tape, vec!["1", "blank"]);
        assert_eq!(definition.tape.initial_index, 1);
        assert_eq!(
            definition.states.halting,
            Some(OneOrMany::Single("B".to_string()))
        );
        assert!(definition.states.null_move);
        assert_eq!(
            definition.states.states["A"]["1"],
            ActionDefinition::new(Some("0"), Some("R"), Some("B"))
        );
        assert!(definition.states.states["B"].is_empty());
    }

    #[test]
    fn test_missing_fields_default() {
        let definition: MachineDefinition = serde_json::from_str("{}").unwrap();

        assert!(definition.alphabet.symbols.is_empty());
        assert!(definition.alphabet.input.is_none());
        assert!(definition.states.halting.is_none());
        assert!(!definition.states.null_move);
        assert_eq!(definition.tape.initial_index, 0);
    }

    #[test]
    fn test_halting_alias() {
        let json = r#"{ "state": { "halting": ["accept", "reject"] } }"#;
        let definition: MachineDefinition = serde_json::from_str(json).unwrap();

        assert_eq!(
            definition.states.halting.unwrap().into_vec(),
            vec!["accept", "reject"]
        );
    }
}
