//! This module defines the `Executor`, which runs a single-tape Turing Machine described by a
//! [`MachineConfiguration`]. It owns the tape, the head position and the current state, and
//! steps them according to the configuration's action tables.

use crate::config::{resolve_blank, MachineConfiguration};
use crate::types::{Action, ExecutionError, Move, State, Step, Symbol};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, trace, warn};

/// Executes a machine configuration over a tape.
///
/// The configuration is shared read-only, so several executors may be built from the
/// same `Arc<MachineConfiguration>`; the tape and head are private to each executor.
#[derive(Debug, Clone)]
pub struct Executor {
    configuration: Arc<MachineConfiguration>,
    state: String,
    tape: Vec<Symbol>,
    head: usize,
    halted: bool,
    step_count: u64,
    initial_tape: Vec<Symbol>,
    initial_head: usize,
}

impl Executor {
    /// Creates a new `Executor` over `tape` with the head at `head`.
    ///
    /// Occurrences of the `blank` keyword on the tape are replaced by the configured blank
    /// symbol.
    ///
    /// # Errors
    ///
    /// * `ExecutionError::SymbolNotInAlphabet` if the tape holds an undeclared symbol.
    /// * `ExecutionError::HeadOutOfRange` if `head` does not point into the tape.
    pub fn new(
        configuration: Arc<MachineConfiguration>,
        tape: Vec<Symbol>,
        head: usize,
    ) -> Result<Self, ExecutionError> {
        let tape = tape
            .iter()
            .map(|symbol| resolve_blank(symbol, configuration.blank()))
            .collect::<Vec<_>>();

        if let Some(symbol) = tape.iter().find(|s| !configuration.is_symbol(s)) {
            return Err(ExecutionError::SymbolNotInAlphabet(symbol.clone()));
        }
        if head >= tape.len() {
            return Err(ExecutionError::HeadOutOfRange {
                index: head,
                len: tape.len(),
            });
        }

        debug!(
            state = %configuration.initial_state(),
            tape_len = tape.len(),
            head,
            "created executor"
        );

        Ok(Self {
            state: configuration.initial_state().to_string(),
            initial_tape: tape.clone(),
            initial_head: head,
            tape,
            head,
            halted: false,
            step_count: 0,
            configuration,
        })
    }

    /// Creates an `Executor` from the configuration's initial tape, or from a single blank
    /// cell when the configuration has none.
    pub fn from_configuration(
        configuration: Arc<MachineConfiguration>,
    ) -> Result<Self, ExecutionError> {
        let (tape, head) = match configuration.initial_tape() {
            Some(initial) => (initial.symbols.clone(), initial.index),
            None => (vec![configuration.blank().to_string()], 0),
        };

        Self::new(configuration, tape, head)
    }

    /// Executes a single step.
    ///
    /// The halting check happens first: a machine that entered a halting state stops on
    /// the following call without touching the tape.
    ///
    /// # Returns
    ///
    /// * `Ok(Step::Continue)` if an action was applied.
    /// * `Ok(Step::Halted)` if the current state is a halting state.
    /// * `Err(ExecutionError::AlreadyHalted)` if the machine halted before this call.
    /// * `Err(ExecutionError::UnexpectedSymbol)` if the current state has no action for the
    ///   symbol under the head. The machine halts.
    pub fn step(&mut self) -> Result<Step, ExecutionError> {
        if self.halted {
            return Err(ExecutionError::AlreadyHalted);
        }

        if self.configuration.is_halting(&self.state) {
            self.halted = true;
            info!(state = %self.state, steps = self.step_count, "machine halted");
            return Ok(Step::Halted);
        }

        let action = match self.action().cloned() {
            Ok(action) => action,
            Err(e) => {
                self.halted = true;
                warn!(error = %e, "machine stopped");
                return Err(e);
            }
        };

        if let Some(symbol) = &action.write {
            self.tape[self.head] = symbol.clone();
        }

        match action.movement {
            Move::Right => {
                self.head += 1;
                if self.head == self.tape.len() {
                    self.tape.push(self.configuration.blank().to_string());
                }
            }
            Move::Left => {
                if self.head == 0 {
                    self.tape.insert(0, self.configuration.blank().to_string());
                } else {
                    self.head -= 1;
                }
            }
            Move::Null => {}
        }

        trace!(
            from = %self.state,
            to = %action.transition,
            head = self.head,
            "step"
        );

        self.state = action.transition;
        self.step_count += 1;

        Ok(Step::Continue)
    }

    /// Runs the machine until it halts.
    pub fn run(&mut self) -> Result<(), ExecutionError> {
        self.run_with(|_| {}, |_| {})
    }

    /// Runs the machine until it halts, calling `before` and `after` around every step and
    /// pausing for the configured execution delay between steps. `after` also sees the
    /// step that failed.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by [`Executor::step`], or
    /// `ExecutionError::StepLimitExceeded` once the configured step limit is reached.
    pub fn run_with<B, A>(&mut self, mut before: B, mut after: A) -> Result<(), ExecutionError>
    where
        B: FnMut(&Executor),
        A: FnMut(&Executor),
    {
        let delay = self.configuration.execution_delay();

        while !self.halted {
            // A machine sitting in a halting state only needs the halting step.
            if let Some(limit) = self.configuration.max_steps() {
                if self.step_count >= limit && !self.configuration.is_halting(&self.state) {
                    warn!(limit, "step limit reached");
                    return Err(ExecutionError::StepLimitExceeded(limit));
                }
            }

            before(self);
            let step = self.step();
            after(self);
            let step = step?;

            if step == Step::Continue && !delay.is_zero() {
                thread::sleep(delay);
            }
        }

        Ok(())
    }

    /// Resets the executor to its initial tape, head position and state.
    pub fn reset(&mut self) {
        self.state = self.configuration.initial_state().to_string();
        self.tape = self.initial_tape.clone();
        self.head = self.initial_head;
        self.halted = false;
        self.step_count = 0;
    }

    /// Returns the action for the symbol under the head in the current state.
    fn action(&self) -> Result<&Action, ExecutionError> {
        self.current()?
            .action(self.symbol())
            .ok_or_else(|| ExecutionError::UnexpectedSymbol {
                state: self.state.clone(),
                symbol: self.symbol().to_string(),
            })
    }

    /// Returns the action map of the current state.
    pub fn current(&self) -> Result<&State, ExecutionError> {
        self.configuration
            .state(&self.state)
            .ok_or_else(|| ExecutionError::UnknownState(self.state.clone()))
    }

    /// Returns the name of the current state.
    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn tape(&self) -> &[Symbol] {
        &self.tape
    }

    pub fn head(&self) -> usize {
        self.head
    }

    /// Returns the symbol under the head.
    pub fn symbol(&self) -> &str {
        &self.tape[self.head]
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn configuration(&self) -> &Arc<MachineConfiguration> {
        &self.configuration
    }

    /// Returns a read-only snapshot of the executor for rendering.
    pub fn to_display(&self) -> Snapshot {
        Snapshot {
            state: self.state.clone(),
            tape: self.tape.clone(),
            head: self.head,
            halted: self.halted,
            step: self.step_count,
        }
    }
}

/// A copy of the observable executor state after a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub state: String,
    pub tape: Vec<Symbol>,
    pub head: usize,
    pub halted: bool,
    pub step: u64,
}

impl fmt::Display for Snapshot {
    /// Renders the tape with the head cell bracketed, followed by the state and head index.
    ///
    /// `0 [1] 1 A 1`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, symbol) in self.tape.iter().enumerate() {
            if i == self.head {
                write!(f, "[{}] ", symbol)?;
            } else {
                write!(f, "{} ", symbol)?;
            }
        }
        write!(f, "{} {}", self.state, self.head)
    }
}
