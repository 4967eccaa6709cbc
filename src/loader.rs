//! This module provides the `ProgramLoader` struct, responsible for reading machine
//! definitions and settings documents from files and strings.

use crate::definition::MachineDefinition;
use crate::settings::Settings;
use crate::types::MachineError;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The document formats definitions and settings can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Recognized file extensions, as `(extension, format)` pairs.
    pub const EXTENSIONS: [(&'static str, Format); 3] = [
        ("json", Format::Json),
        ("yaml", Format::Yaml),
        ("yml", Format::Yaml),
    ];

    /// Picks the format from a path's extension, ignoring case.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();

        Self::EXTENSIONS
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, format)| *format)
    }

    /// Parses `content` as a document of this format.
    pub fn parse<T: DeserializeOwned>(self, content: &str) -> Result<T, MachineError> {
        match self {
            Format::Json => {
                serde_json::from_str(content).map_err(|e| MachineError::ParseError(e.to_string()))
            }
            Format::Yaml => {
                serde_yaml::from_str(content).map_err(|e| MachineError::ParseError(e.to_string()))
            }
        }
    }
}

/// `ProgramLoader` is a utility struct for loading machine definitions and settings.
/// It provides methods to load single documents from files or strings, and to discover
/// and load all definition files within a directory.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads a machine definition from the specified file path.
    ///
    /// `.json` files are parsed as JSON. `.yaml`, `.yml` and any other extension are
    /// parsed as YAML, which also accepts JSON documents.
    ///
    /// # Returns
    ///
    /// * `Ok(MachineDefinition)` if the file is read and parsed.
    /// * `Err(MachineError::FileError)` if the file cannot be read.
    /// * `Err(MachineError::ParseError)` if the content is not a valid definition.
    pub fn load_definition(path: &Path) -> Result<MachineDefinition, MachineError> {
        let content = read(path)?;
        let mut definition = Self::load_definition_from_str(&content, format_of(path))?;

        if definition.name.is_empty() {
            if let Some(stem) = path.file_stem() {
                definition.name = stem.to_string_lossy().into_owned();
            }
        }

        Ok(definition)
    }

    /// Parses a machine definition from JSON content.
    pub fn load_definition_from_string(content: &str) -> Result<MachineDefinition, MachineError> {
        Format::Json.parse(content)
    }

    /// Parses a machine definition from content in the given format.
    pub fn load_definition_from_str(
        content: &str,
        format: Format,
    ) -> Result<MachineDefinition, MachineError> {
        format.parse(content)
    }

    /// Loads all definition files (`.json`, `.yaml` or `.yml` extension) from a given directory.
    ///
    /// Directories and files with other extensions are skipped. Each element of the
    /// result is either the loaded definition with its path, or the error that occurred
    /// while loading it.
    pub fn load_definitions(
        directory: &Path,
    ) -> Vec<Result<(PathBuf, MachineDefinition), MachineError>> {
        if !directory.exists() {
            return vec![Err(MachineError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(MachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        entries
            .filter_map(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        return Some(Err(MachineError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                let path = entry.path();

                if path.is_dir() || Format::from_path(&path).is_none() {
                    return None;
                }

                match Self::load_definition(&path) {
                    Ok(definition) => Some(Ok((path, definition))),
                    Err(e) => Some(Err(MachineError::FileError(format!(
                        "Failed to load definition from {}: {}",
                        path.display(),
                        e
                    )))),
                }
            })
            .collect()
    }

    /// Loads a settings document from the specified file path, choosing the format the
    /// same way as [`ProgramLoader::load_definition`].
    pub fn load_settings(path: &Path) -> Result<Settings, MachineError> {
        let content = read(path)?;
        Self::load_settings_from_str(&content, format_of(path))
    }

    pub fn load_settings_from_string(content: &str) -> Result<Settings, MachineError> {
        Format::Json.parse(content)
    }

    pub fn load_settings_from_str(content: &str, format: Format) -> Result<Settings, MachineError> {
        format.parse(content)
    }
}

fn read(path: &Path) -> Result<String, MachineError> {
    debug!(path = %path.display(), "reading document");

    fs::read_to_string(path).map_err(|e| {
        MachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
    })
}

fn format_of(path: &Path) -> Format {
    Format::from_path(path).unwrap_or(Format::Yaml)
}
