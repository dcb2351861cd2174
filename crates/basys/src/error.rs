// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Error types for the basys configuration pipeline.
//!
//! Two classes of failure exist and they never mix:
//!
//! - [`ConfigError`]: fatal configuration errors. There is no valid partial
//!   resolved configuration, so these propagate immediately and the caller
//!   must not proceed to synthesis.
//! - [`Diagnostic`]: recoverable per-component errors (a metadata block that
//!   fails to parse, a page path that fails to compile, a missing user entry
//!   module). These are collected against the current build cycle and never
//!   abort the work on other components.

use crate::json5::Json5Error;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal configuration errors.
///
/// All variants carry enough context to print a file/field-qualified message.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The manifest file could not be read.
    #[error("failed to read {path}: {source}")]
    ManifestRead {
        /// Path to the manifest file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The manifest file is not valid tolerant JSON.
    ///
    /// Callers reporting this to an operator should also print
    /// [`crate::json5::SYNTAX_HELP`].
    #[error("syntax error in {path}: {source}")]
    ManifestSyntax {
        /// Path to the manifest file.
        path: PathBuf,
        /// The parse error with line/column.
        source: Json5Error,
    },

    /// The manifest parsed but has the wrong shape.
    #[error("{path}: {reason}")]
    ManifestShape {
        /// Path to the manifest file.
        path: PathBuf,
        /// What is wrong with the manifest value.
        reason: String,
    },

    /// Several apps are declared and no app name was given.
    #[error("several apps are declared, pass an explicit app name (one of: {})", names.join(", "))]
    AppNameRequired {
        /// The declared app names.
        names: Vec<String>,
    },

    /// The requested app is not declared in the manifest.
    #[error("unknown app {name:?}, declared apps are: {}", names.join(", "))]
    UnknownApp {
        /// The requested app name.
        name: String,
        /// The declared app names.
        names: Vec<String>,
    },

    /// An app declaration does not carry a `type` field.
    #[error("app {app:?} does not declare a \"type\" (expected one of: web, mobile, desktop)")]
    MissingAppKind {
        /// The app name.
        app: String,
    },

    /// An app declaration carries an unsupported `type`.
    #[error("app {app:?} has unsupported type {kind:?} (expected one of: web, mobile, desktop)")]
    InvalidAppKind {
        /// The app name.
        app: String,
        /// The declared kind value.
        kind: String,
    },

    /// A key under `custom` collides with a built-in configuration key.
    #[error("app {app:?}: custom option {key:?} collides with a built-in configuration key")]
    CustomOptionCollision {
        /// The app name.
        app: String,
        /// The colliding key.
        key: String,
    },

    /// An app declaration carries a key outside the built-in set.
    #[error("app {app:?}: unrecognized option {key:?} (custom options belong under \"custom\")")]
    UnknownOption {
        /// The app name.
        app: String,
        /// The unrecognized key.
        key: String,
    },

    /// A built-in configuration key carries a value of the wrong type.
    #[error("invalid configuration value: {message}")]
    InvalidOptionValue {
        /// Description of the type mismatch.
        message: String,
    },

    /// The scratch directory could not be created.
    #[error("failed to create scratch directory {path}: {source}")]
    ScratchDir {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The component source tree could not be enumerated.
    #[error("failed to scan components: {message}")]
    ComponentScan {
        /// Description of the enumeration failure.
        message: String,
    },

    /// A synthesized entry file could not be written.
    #[error("failed to write entry {path}: {source}")]
    EntryWrite {
        /// The entry file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Convenience type alias for Results with [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;

/// A recoverable, file-tagged build diagnostic.
///
/// Diagnostics are attached to the build cycle that produced them; the
/// external bundler layer decides whether they block final build success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The file the diagnostic is attributed to.
    pub file: PathBuf,
    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    /// Creates a diagnostic attributed to `file`.
    pub fn new(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.message)
    }
}
