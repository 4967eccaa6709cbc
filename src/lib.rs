//! This crate provides the core logic for a declarative, single-tape Turing Machine interpreter.
//! It includes modules for reading machine definitions, validating them into immutable
//! machine configurations, executing them step by step, and a collection of bundled machines.

pub mod config;
pub mod definition;
pub mod loader;
pub mod machine;
pub mod one_or_many;
pub mod programs;
pub mod settings;
pub mod types;

/// Re-exports the validated configuration and its initial tape from the config module.
pub use config::{InitialTape, MachineConfiguration};
/// Re-exports the raw definition records from the definition module.
pub use definition::{
    ActionDefinition, AlphabetDefinition, MachineDefinition, StateDefinition, TapeDefinition,
};
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the execution engine and its display snapshot from the machine module.
pub use machine::{Executor, Snapshot};
pub use one_or_many::OneOrMany;
/// Re-exports `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{ProgramInfo, ProgramManager, PROGRAMS};
pub use settings::{ExecutionSettings, GeneralSettings, Settings};
/// Re-exports the core types and errors from the types module.
pub use types::{
    Action, ConfigError, ExecutionError, MachineError, Move, State, Step, Symbol, BLANK_KEYWORD,
    DEFAULT_KEYWORD,
};
