//! This module defines the core data structures and types used throughout the Turing Machine
//! interpreter, including symbols, moves, actions, states, execution results, and error types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// A tape symbol. Symbols are opaque tokens declared by the machine's alphabet.
pub type Symbol = String;

/// Keyword standing in for the configured blank symbol in definitions and tapes.
pub const BLANK_KEYWORD: &str = "blank";
/// Keyword for the per-state fallback action.
pub const DEFAULT_KEYWORD: &str = "default";
/// Keywords that can never be declared as alphabet symbols.
pub const RESERVED_KEYWORDS: [&str; 2] = [DEFAULT_KEYWORD, BLANK_KEYWORD];

/// Represents the possible moves of the tape head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    #[serde(rename = "R")]
    Right,
    #[serde(rename = "L")]
    Left,
    /// Keep the head in the same position.
    #[serde(rename = "N")]
    Null,
}

impl Move {
    pub const TOKENS: [&'static str; 3] = ["R", "L", "N"];

    /// Parses a move token as written in a definition.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "R" => Some(Move::Right),
            "L" => Some(Move::Left),
            "N" => Some(Move::Null),
            _ => None,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Move::Right => "R",
            Move::Left => "L",
            Move::Null => "N",
        }
    }
}

/// A fully resolved action: what to write, where to move, and which state to enter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Symbol to write under the head. `None` leaves the cell unchanged.
    pub write: Option<Symbol>,
    #[serde(rename = "move")]
    pub movement: Move,
    pub transition: String,
}

impl Action {
    pub fn new(write: Option<&str>, movement: Move, transition: &str) -> Self {
        Self {
            write: write.map(str::to_string),
            movement,
            transition: transition.to_string(),
        }
    }
}

/// A named node of the transition graph: the action taken for each symbol read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State {
    actions: BTreeMap<Symbol, Action>,
}

impl State {
    pub fn new(actions: BTreeMap<Symbol, Action>) -> Self {
        Self { actions }
    }

    /// Returns the action for `symbol`, if the state defines one.
    pub fn action(&self, symbol: &str) -> Option<&Action> {
        self.actions.get(symbol)
    }

    pub fn actions(&self) -> &BTreeMap<Symbol, Action> {
        &self.actions
    }

    /// A state without any action can never move the machine on.
    pub fn is_terminal(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Represents the outcome of a successful execution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The machine performed a step and can continue.
    Continue,
    /// The machine found itself in a halting state and stopped.
    Halted,
}

/// Errors raised while turning a [`MachineDefinition`](crate::definition::MachineDefinition)
/// into a [`MachineConfiguration`](crate::config::MachineConfiguration).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("the execution delay was negative: {0}")]
    NegativeExecutionDelay(i64),
    #[error("symbol alphabet was not specified")]
    EmptyAlphabet,
    #[error("'{0}' is a protected keyword and cannot be set as a symbol")]
    ReservedSymbolUsed(String),
    #[error("blank symbol was not specified")]
    MissingBlankSymbol,
    #[error("the blank symbol '{blank}' was not found in the alphabet {alphabet:?}")]
    BlankNotInAlphabet { blank: String, alphabet: Vec<Symbol> },
    #[error("input symbols were not defined")]
    MissingInputSymbols,
    #[error("the input symbol '{symbol}' was not found in the alphabet {alphabet:?}")]
    UndeclaredInput { symbol: String, alphabet: Vec<Symbol> },
    #[error("initial tape contained symbol '{symbol}' not present in the alphabet {alphabet:?}")]
    TapeSymbolNotInAlphabet { symbol: String, alphabet: Vec<Symbol> },
    #[error("initial tape index {index} was outside the range of the initial tape {tape:?}")]
    HeadOutOfRange { index: i64, tape: Vec<Symbol> },
    #[error("the action symbol '{symbol}' for state '{state}' was not found in the alphabet")]
    UndeclaredActionSymbol { state: String, symbol: String },
    #[error("the write symbol '{write}' for action symbol '{symbol}' in state '{state}' was not found in the alphabet")]
    WriteNotInAlphabet {
        state: String,
        symbol: String,
        write: String,
    },
    #[error("the write symbol '{write}' for action symbol '{symbol}' in state '{state}' was not in the permitted inputs")]
    WriteNotPermitted {
        state: String,
        symbol: String,
        write: String,
    },
    #[error("the move '{token}' for action symbol '{symbol}' in state '{state}' was not L, R or N")]
    IllegalMove {
        state: String,
        symbol: String,
        token: String,
    },
    #[error("the transition state '{target}' for action symbol '{symbol}' in state '{state}' was not found in the state definitions")]
    UnknownTransitionTarget {
        state: String,
        symbol: String,
        target: String,
    },
    #[error("null move specified in state '{state}' for symbol '{symbol}', while null moves are disallowed")]
    NullMoveDisallowed { state: String, symbol: String },
    #[error("the initial state was not defined")]
    MissingInitialState,
    #[error("the initial state '{0}' was not found in the state definitions")]
    UnknownInitialState(String),
    #[error("the halting state was not defined")]
    MissingHaltingStates,
    #[error("the halting state '{0}' was not found in the state definitions")]
    UnknownHaltingState(String),
}

/// Errors raised by the execution engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("Turing machine has halted")]
    AlreadyHalted,
    #[error("state '{state}' has no action for symbol '{symbol}'")]
    UnexpectedSymbol { state: String, symbol: String },
    #[error("state '{0}' is not defined")]
    UnknownState(String),
    #[error("tape symbol '{0}' is not part of the alphabet")]
    SymbolNotInAlphabet(String),
    #[error("head index {index} is outside of a tape of length {len}")]
    HeadOutOfRange { index: usize, len: usize },
    #[error("machine did not halt within {0} steps")]
    StepLimitExceeded(u64),
}

/// Represents every error the crate can report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MachineError {
    #[error("Could not create Turing Machine configuration, {0}")]
    Config(#[from] ConfigError),
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),
    /// Indicates a definition or settings document that does not parse as its schema in the chosen format.
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
}
