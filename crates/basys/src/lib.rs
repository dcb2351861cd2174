// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

//! # basys
//!
//! Project scaffolding and build orchestration for component-based web apps.
//!
//! basys reads a tolerant-JSON project manifest (`basys.json`), resolves a
//! per-app, per-environment configuration, scans the source tree for
//! components carrying embedded `<info>` metadata, compiles their declared
//! page paths into routes, and synthesizes the frontend/backend entry
//! modules into a scratch directory for the bundler to consume.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use basys::config::{resolve, Env};
//! use basys::pipeline::Pipeline;
//!
//! let config = resolve(project_dir, Some("admin"), Env::Dev)?;
//! let pipeline = Pipeline::new(config);
//! let cycle = pipeline.run_cycle().await?;
//! for diagnostic in &cycle.diagnostics {
//!     eprintln!("{diagnostic}");
//! }
//! ```

/// Configuration resolution: defaults, merging, the resolved snapshot.
pub mod config;
/// Frontend and backend entry module synthesis.
pub mod entries;
/// Error types and diagnostics.
pub mod error;
/// Tolerant-JSON parsing for manifests and component metadata.
pub mod json5;
/// Project manifest loading and app selection.
pub mod manifest;
/// The scan / compile / synthesize cycle.
pub mod pipeline;
/// Page path validation and route compilation.
pub mod routes;
/// Component discovery and metadata extraction.
pub mod scanner;
/// Debounced file watching for the dev loop.
pub mod watcher;

pub use config::{resolve, AppKind, Env, ResolvedConfig};
pub use error::{ConfigError, Diagnostic, Result};
pub use manifest::Manifest;
pub use pipeline::{BuildCycle, Pipeline};
pub use scanner::ComponentInfo;
pub use watcher::{ChangeBatch, ChangeWatcher};
