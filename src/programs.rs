use crate::definition::MachineDefinition;
use crate::loader::{Format, ProgramLoader};
use crate::types::MachineError;

use std::sync::RwLock;
use tracing::warn;

// Default embedded definitions
const PROGRAM_TEXTS: [(Format, &str); 3] = [
    (Format::Json, include_str!("../machines/binary-increment.json")),
    (Format::Json, include_str!("../machines/busy-beaver-2.json")),
    (Format::Yaml, include_str!("../machines/replace-x.yaml")),
];

lazy_static::lazy_static! {
    pub static ref PROGRAMS: RwLock<Vec<MachineDefinition>> = RwLock::new(Vec::new());
}

pub struct ProgramManager;

impl ProgramManager {
    /// Parses the embedded definitions into the program registry.
    pub fn load() -> Result<(), MachineError> {
        load_into(&PROGRAMS)
    }

    /// Loads the embedded definitions unless that already happened.
    fn ensure_loaded() {
        ensure_loaded_into(&PROGRAMS);
    }

    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        Self::ensure_loaded();

        PROGRAMS.read().map(|programs| programs.len()).unwrap_or(0)
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<MachineDefinition, MachineError> {
        Self::ensure_loaded();

        PROGRAMS
            .read()
            .map_err(|_| MachineError::FileError("Failed to acquire read lock".to_string()))?
            .get(index)
            .cloned()
            .ok_or_else(|| MachineError::FileError(format!("Program index {} out of range", index)))
    }

    /// Get a program by its name, ignoring case
    pub fn get_program_by_name(name: &str) -> Result<MachineDefinition, MachineError> {
        Self::ensure_loaded();

        PROGRAMS
            .read()
            .map_err(|_| MachineError::FileError("Failed to acquire read lock".to_string()))?
            .iter()
            .find(|program| program.name.eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| MachineError::FileError(format!("Program '{}' not found", name)))
    }

    /// List all program names
    pub fn list_program_names() -> Vec<String> {
        Self::ensure_loaded();

        PROGRAMS
            .read()
            .map(|programs| {
                programs
                    .iter()
                    .map(|program| program.name.clone())
                    .collect()
            })
            .unwrap_or_else(|_| Vec::new())
    }

    /// Get information about a program by its index
    pub fn get_program_info(index: usize) -> Result<ProgramInfo, MachineError> {
        let program = Self::get_program_by_index(index)?;

        Ok(ProgramInfo {
            index,
            name: program.name.clone(),
            initial_state: program.states.initial.clone(),
            initial_tape: program.tape.initial_tape.clone(),
            state_count: program.states.states.len(),
            action_count: program.states.states.values().map(|actions| actions.len()).sum(),
        })
    }

    /// Get the original text of a program by its index
    pub fn get_program_text_by_index(index: usize) -> Result<&'static str, MachineError> {
        PROGRAM_TEXTS.get(index).map(|(_, text)| *text).ok_or_else(|| {
            MachineError::FileError(format!("Program text index {} out of range", index))
        })
    }
}

fn load_into(registry: &RwLock<Vec<MachineDefinition>>) -> Result<(), MachineError> {
    let mut programs = Vec::new();

    for (index, (format, program_text)) in PROGRAM_TEXTS.iter().enumerate() {
        match ProgramLoader::load_definition_from_str(program_text, *format) {
            Ok(definition) => programs.push(definition),
            Err(e) => warn!(index, error = %e, "failed to parse embedded definition"),
        }
    }

    let mut write_guard = registry
        .write()
        .map_err(|_| MachineError::FileError("Failed to acquire write lock".to_string()))?;
    *write_guard = programs;

    Ok(())
}

fn ensure_loaded_into(registry: &RwLock<Vec<MachineDefinition>>) {
    let loaded = registry
        .read()
        .map(|programs| !programs.is_empty())
        .unwrap_or(false);

    if !loaded {
        if let Err(e) = load_into(registry) {
            warn!(error = %e, "failed to load embedded definitions");
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProgramInfo {
    pub index: usize,
    pub name: String,
    pub initial_state: String,
    pub initial_tape: Vec<String>,
    pub state_count: usize,
    /// Number of declared actions, before `default` expansion.
    pub action_count: usize,
}
