//! This module turns a raw [`MachineDefinition`] into a validated, normalized
//! [`MachineConfiguration`]. Validation stops at the first violated rule and reports it
//! as a [`ConfigError`]; a configuration is either fully valid or not produced at all.

use crate::definition::{ActionDefinition, MachineDefinition};
use crate::one_or_many::OneOrMany;
use crate::settings::ExecutionSettings;
use crate::types::{
    Action, ConfigError, Move, State, Symbol, BLANK_KEYWORD, DEFAULT_KEYWORD, RESERVED_KEYWORDS,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

/// A validated initial tape and head position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitialTape {
    pub symbols: Vec<Symbol>,
    pub index: usize,
}

/// The validated, immutable description of a machine.
///
/// Every state's action map only refers to alphabet symbols and existing states, and
/// contains an entry for every alphabet symbol whenever the state declared a `default`
/// action. Once built it is never mutated, so it can be shared between executors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineConfiguration {
    name: String,
    execution_delay_ms: u64,
    symbols: Vec<Symbol>,
    blank: Symbol,
    permitted_input: OneOrMany<Symbol>,
    initial_state: String,
    halting_states: OneOrMany<String>,
    states: BTreeMap<String, State>,
    tape: Option<InitialTape>,
    max_steps: Option<u64>,
}

impl MachineConfiguration {
    /// Validates `definition` against `settings` and builds the configuration.
    ///
    /// The initial tape is taken from `settings` when it carries one, otherwise from the
    /// definition when its tape is not empty.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] of the first rule the definition violates.
    pub fn build(
        definition: &MachineDefinition,
        settings: &ExecutionSettings,
    ) -> Result<Self, ConfigError> {
        let execution_delay_ms = u64::try_from(settings.execution_delay_ms)
            .map_err(|_| ConfigError::NegativeExecutionDelay(settings.execution_delay_ms))?;

        let symbols = &definition.alphabet.symbols;
        if symbols.is_empty() {
            return Err(ConfigError::EmptyAlphabet);
        }

        if let Some(keyword) = RESERVED_KEYWORDS
            .iter()
            .find(|keyword| symbols.iter().any(|s| s == *keyword))
        {
            return Err(ConfigError::ReservedSymbolUsed(keyword.to_string()));
        }

        let blank = &definition.alphabet.blank;
        if blank.is_empty() {
            return Err(ConfigError::MissingBlankSymbol);
        }
        if !symbols.contains(blank) {
            return Err(ConfigError::BlankNotInAlphabet {
                blank: blank.clone(),
                alphabet: symbols.clone(),
            });
        }

        let permitted_input = match &definition.alphabet.input {
            Some(input) if !input.iter().all(String::is_empty) => input.clone(),
            _ => return Err(ConfigError::MissingInputSymbols),
        };
        if let Some(symbol) = permitted_input.iter().find(|s| !symbols.contains(s)) {
            return Err(ConfigError::UndeclaredInput {
                symbol: symbol.clone(),
                alphabet: symbols.clone(),
            });
        }

        let tape = match &settings.initial_tape {
            Some(tape) => Some(validate_tape(tape, settings.initial_index, symbols, blank)?),
            None if !definition.tape.initial_tape.is_empty() => Some(validate_tape(
                &definition.tape.initial_tape,
                definition.tape.initial_index,
                symbols,
                blank,
            )?),
            None => None,
        };

        let builder = StateBuilder {
            symbols,
            blank,
            permitted_input: &permitted_input,
            null_move: definition.states.null_move,
            definition,
        };
        let states = definition
            .states
            .states
            .iter()
            .map(|(name, actions)| Ok((name.clone(), builder.build(name, actions)?)))
            .collect::<Result<BTreeMap<_, _>, ConfigError>>()?;

        let initial_state = &definition.states.initial;
        if initial_state.is_empty() {
            return Err(ConfigError::MissingInitialState);
        }
        if !states.contains_key(initial_state) {
            return Err(ConfigError::UnknownInitialState(initial_state.clone()));
        }

        let halting_states = match &definition.states.halting {
            Some(halting) if !halting.iter().all(String::is_empty) => halting.clone(),
            _ => return Err(ConfigError::MissingHaltingStates),
        };
        if let Some(name) = halting_states.iter().find(|s| !states.contains_key(*s)) {
            return Err(ConfigError::UnknownHaltingState(name.clone()));
        }

        debug!(
            name = %definition.name,
            states = states.len(),
            symbols = symbols.len(),
            initial = %initial_state,
            "built machine configuration"
        );

        Ok(Self {
            name: definition.name.clone(),
            execution_delay_ms,
            symbols: symbols.clone(),
            blank: blank.clone(),
            permitted_input,
            initial_state: initial_state.clone(),
            halting_states,
            states,
            tape,
            max_steps: settings.max_steps,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn execution_delay(&self) -> Duration {
        Duration::from_millis(self.execution_delay_ms)
    }

    /// The declared alphabet, in declaration order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn blank(&self) -> &str {
        &self.blank
    }

    pub fn permitted_input(&self) -> &OneOrMany<Symbol> {
        &self.permitted_input
    }

    pub fn initial_state(&self) -> &str {
        &self.initial_state
    }

    pub fn halting_states(&self) -> &OneOrMany<String> {
        &self.halting_states
    }

    pub fn is_halting(&self, state: &str) -> bool {
        self.halting_states.iter().any(|s| s == state)
    }

    pub fn is_symbol(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    pub fn state(&self, name: &str) -> Option<&State> {
        self.states.get(name)
    }

    pub fn states(&self) -> &BTreeMap<String, State> {
        &self.states
    }

    /// The validated initial tape, if the definition or the settings declared one.
    pub fn initial_tape(&self) -> Option<&InitialTape> {
        self.tape.as_ref()
    }

    pub fn max_steps(&self) -> Option<u64> {
        self.max_steps
    }
}

/// Replaces the `blank` keyword with the configured blank symbol.
pub(crate) fn resolve_blank(symbol: &str, blank: &str) -> Symbol {
    if symbol == BLANK_KEYWORD {
        blank.to_string()
    } else {
        symbol.to_string()
    }
}

fn validate_tape(
    tape: &[String],
    index: i64,
    symbols: &[Symbol],
    blank: &str,
) -> Result<InitialTape, ConfigError> {
    let tape = tape
        .iter()
        .map(|symbol| {
            let symbol = resolve_blank(symbol, blank);
            if symbols.contains(&symbol) {
                Ok(symbol)
            } else {
                Err(ConfigError::TapeSymbolNotInAlphabet {
                    symbol,
                    alphabet: symbols.to_vec(),
                })
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    match usize::try_from(index) {
        Ok(position) if position < tape.len() => Ok(InitialTape {
            symbols: tape,
            index: position,
        }),
        _ => Err(ConfigError::HeadOutOfRange { index, tape }),
    }
}

/// Normalizes the action maps of individual states.
struct StateBuilder<'a> {
    symbols: &'a [Symbol],
    blank: &'a str,
    permitted_input: &'a OneOrMany<Symbol>,
    null_move: bool,
    definition: &'a MachineDefinition,
}

impl StateBuilder<'_> {
    /// Collects the explicit actions and the optional `default` template first, then
    /// fills every alphabet symbol without an explicit action from the template.
    fn build(
        &self,
        name: &str,
        definitions: &BTreeMap<String, ActionDefinition>,
    ) -> Result<State, ConfigError> {
        let mut actions = BTreeMap::new();
        let mut fallback = None;

        for (raw, definition) in definitions {
            let symbol = resolve_blank(raw, self.blank);
            let action = self.action(name, &symbol, definition)?;

            if symbol == DEFAULT_KEYWORD {
                fallback = Some(action);
            } else if raw == BLANK_KEYWORD {
                // An entry naming the blank symbol directly takes precedence.
                actions.entry(symbol).or_insert(action);
            } else {
                actions.insert(symbol, action);
            }
        }

        if let Some(fallback) = fallback {
            for symbol in self.symbols {
                actions.entry(symbol.clone()).or_insert_with(|| Action {
                    write: Some(symbol.clone()),
                    movement: fallback.movement,
                    transition: fallback.transition.clone(),
                });
            }
        }

        Ok(State::new(actions))
    }

    fn action(
        &self,
        state: &str,
        symbol: &str,
        definition: &ActionDefinition,
    ) -> Result<Action, ConfigError> {
        let is_default = symbol == DEFAULT_KEYWORD;
        let present = |field: &Option<String>| field.clone().filter(|value| !value.is_empty());

        let transition = present(&definition.transition).unwrap_or_else(|| state.to_string());
        let write = present(&definition.write).map(|write| resolve_blank(&write, self.blank));

        if !is_default && !self.symbols.iter().any(|s| s == symbol) {
            return Err(ConfigError::UndeclaredActionSymbol {
                state: state.to_string(),
                symbol: symbol.to_string(),
            });
        }

        if let (false, Some(write)) = (is_default, &write) {
            if !self.symbols.contains(write) {
                return Err(ConfigError::WriteNotInAlphabet {
                    state: state.to_string(),
                    symbol: symbol.to_string(),
                    write: write.clone(),
                });
            }
            if write != self.blank && !self.permitted_input.contains(write) {
                return Err(ConfigError::WriteNotPermitted {
                    state: state.to_string(),
                    symbol: symbol.to_string(),
                    write: write.clone(),
                });
            }
        }

        let movement = match present(&definition.movement) {
            Some(token) => Some(Move::from_token(&token).ok_or_else(|| {
                ConfigError::IllegalMove {
                    state: state.to_string(),
                    symbol: symbol.to_string(),
                    token,
                }
            })?),
            None => None,
        };

        if !self.definition.states.states.contains_key(&transition) {
            return Err(ConfigError::UnknownTransitionTarget {
                state: state.to_string(),
                symbol: symbol.to_string(),
                target: transition,
            });
        }

        let movement = match (movement, self.null_move) {
            (Some(Move::Null) | None, false) => {
                return Err(ConfigError::NullMoveDisallowed {
                    state: state.to_string(),
                    symbol: symbol.to_string(),
                })
            }
            (None, true) => Move::Null,
            (Some(movement), _) => movement,
        };

        Ok(Action {
            write: write.or_else(|| Some(symbol.to_string())),
            movement,
            transition,
        })
    }
}
