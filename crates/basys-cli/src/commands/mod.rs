// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! CLI command implementations.
//!
//! This module contains the implementations for the basys CLI commands:
//!
//! - `build`: One-shot synthesis for production
//! - `dev`: Development session with file watching and regeneration

/// Production build command.
pub mod build;
/// Development session command.
pub mod dev;
