// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

//! basys CLI library.
//!
//! This crate provides the command-line interface for basys. It includes the
//! development session (initial synthesis, file watching, regeneration) and
//! the production build command.
//!
//! # Usage
//!
//! This crate is primarily used through the `basys` binary:
//!
//! ```bash
//! basys dev      # Start the development session
//! basys build    # Synthesize for production
//! ```
//!
//! # Configuration
//!
//! Projects are configured via `basys.json` at the project root.

/// Scratch-dir artifacts consumed by the dev server and app builder.
pub mod artifacts;
/// CLI commands (dev, build).
pub mod commands;
/// Free-port probing for the development session.
pub mod ports;
