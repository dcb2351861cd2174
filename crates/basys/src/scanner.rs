// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Component discovery and metadata extraction.
//!
//! Components are `.vue` single-file components under `<projectDir>/src`.
//! Each may embed one `<info>` block holding tolerant-JSON metadata:
//!
//! ```text
//! <info>
//! {
//!   path: '/users/:id',   // page path, registers the component as a route
//!   apps: ['admin'],      // restrict the component to these apps
//! }
//! </info>
//! ```
//!
//! A component without metadata is still registered (eligible for non-routed
//! use) with empty info. Metadata that fails to parse is a per-component
//! diagnostic naming the file; the scan continues. Every scan is a full
//! re-scan: callers decide when to re-run.

use crate::config::ResolvedConfig;
use crate::error::{ConfigError, Diagnostic, Result};
use crate::json5;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

lazy_static! {
    static ref INFO_BLOCK: Regex =
        Regex::new(r"(?s)<info>(.*?)</info>").unwrap();
}

/// Metadata declared in a component's `<info>` block.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ComponentInfo {
    /// Declared page path pattern, if the component opted into routing.
    #[serde(default)]
    pub path: Option<String>,
    /// App-name allowlist; absence means the component applies to every app.
    #[serde(default)]
    pub apps: Option<Vec<String>>,
}

/// Result of one full component scan.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Discovered components keyed by absolute file path. The map is ordered
    /// so downstream synthesis output is deterministic.
    pub components: BTreeMap<PathBuf, ComponentInfo>,
    /// Per-component metadata errors collected during the scan.
    pub errors: Vec<Diagnostic>,
}

/// Scans `<projectDir>/src` for components applicable to the active app.
///
/// A component declaring an `apps` allowlist that does not contain
/// `config.app_name` is excluded from the result.
pub fn scan(config: &ResolvedConfig) -> Result<ScanResult> {
    let pattern = format!("{}/**/*.vue", config.src_dir().display());
    let paths = glob::glob(&pattern).map_err(|e| ConfigError::ComponentScan {
        message: e.to_string(),
    })?;

    let mut result = ScanResult::default();
    for path in paths.flatten() {
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                result
                    .errors
                    .push(Diagnostic::new(&path, format!("failed to read: {e}")));
                continue;
            }
        };

        let info = match extract_info(&text) {
            Ok(info) => info,
            Err(message) => {
                result.errors.push(Diagnostic::new(&path, message));
                continue;
            }
        };

        let info = info.unwrap_or_default();
        let used_in_app = match &info.apps {
            Some(apps) => apps.iter().any(|app| app == &config.app_name),
            None => true,
        };
        if used_in_app {
            result.components.insert(path, info);
        }
    }

    tracing::debug!(
        components = result.components.len(),
        errors = result.errors.len(),
        "component scan finished"
    );
    Ok(result)
}

/// Extracts and parses the `<info>` block from component source text.
///
/// Returns `Ok(None)` when the component carries no metadata.
fn extract_info(text: &str) -> std::result::Result<Option<ComponentInfo>, String> {
    let Some(captures) = INFO_BLOCK.captures(text) else {
        return Ok(None);
    };
    let block = captures.get(1).map(|m| m.as_str()).unwrap_or_default();

    let value = json5::parse(block).map_err(|e| format!("invalid info block: {e}"))?;
    let info: ComponentInfo =
        serde_json::from_value(value).map_err(|e| format!("invalid info block: {e}"))?;
    Ok(Some(info))
}
