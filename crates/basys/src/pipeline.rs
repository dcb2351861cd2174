// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! The synthesis pipeline: scan, compile, synthesize, as one unit.
//!
//! Within one cycle the component scanner, route compiler and entry
//! synthesizer run in strict sequence: route compilation observes a
//! complete component registry and synthesis observes a complete compiled
//! route set. A `tokio::sync::Mutex` guarantees at most one cycle executes
//! at a time; concurrent triggers queue on the lock instead of interleaving.
//!
//! Every cycle is stamped with a monotonically increasing generation number
//! that also appears in both written entry files, so the on-disk
//! frontend/backend pair always belongs to one scan generation. The
//! registry/route/entry triple is assembled fully before it is published:
//! consumers never observe the registry of cycle N next to the routes of
//! cycle N-1.

use crate::config::ResolvedConfig;
use crate::entries::{self, EntrySource, SynthesisOutput};
use crate::error::{Diagnostic, Result};
use crate::routes::{self, CompiledRoute};
use crate::scanner::{self, ComponentInfo};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;

/// The immutable result of one synthesis cycle.
#[derive(Debug, Clone)]
pub struct BuildCycle {
    /// The cycle's scan generation.
    pub generation: u64,
    /// The component registry observed by this cycle.
    pub components: BTreeMap<PathBuf, ComponentInfo>,
    /// Routes compiled from this cycle's registry.
    pub routes: Vec<CompiledRoute>,
    /// Entries written by this cycle.
    pub entries: Vec<EntrySource>,
    /// All diagnostics collected during the cycle (scan, routes, synthesis).
    pub diagnostics: Vec<Diagnostic>,
}

/// Drives full synthesis cycles against one resolved configuration.
///
/// The configuration is owned by the build/dev session: on manifest change a
/// new `Pipeline` is constructed from a freshly resolved snapshot rather
/// than mutating this one.
pub struct Pipeline {
    config: ResolvedConfig,
    generation: AtomicU64,
    cycle_lock: Mutex<()>,
    current: StdMutex<Option<Arc<BuildCycle>>>,
}

impl Pipeline {
    /// Creates a pipeline for one resolved configuration snapshot.
    pub fn new(config: ResolvedConfig) -> Self {
        Self {
            config,
            generation: AtomicU64::new(0),
            cycle_lock: Mutex::new(()),
            current: StdMutex::new(None),
        }
    }

    /// The configuration this pipeline was built with.
    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// The last completed cycle, if any.
    ///
    /// The triple swaps atomically: the returned cycle is always internally
    /// consistent.
    pub fn current(&self) -> Option<Arc<BuildCycle>> {
        self.current.lock().ok().and_then(|cycle| cycle.clone())
    }

    /// Whether `path` is part of the current component registry.
    ///
    /// Used by the dev loop to skip re-synthesis for deletions of files that
    /// were never registered.
    pub fn is_registered(&self, path: &Path) -> bool {
        self.current()
            .map(|cycle| cycle.components.contains_key(path))
            .unwrap_or(false)
    }

    /// Runs one full synthesis cycle and publishes its result.
    ///
    /// Cycles never interleave: a second caller waits for the in-flight
    /// cycle to run to completion. There is no mid-cycle cancellation.
    pub async fn run_cycle(&self) -> Result<Arc<BuildCycle>> {
        let _guard = self.cycle_lock.lock().await;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(generation, app = %self.config.app_name, "synthesis cycle started");

        let scanned = scanner::scan(&self.config)?;
        let (routes, route_errors) =
            routes::compile_routes(&scanned.components, self.config.case_sensitive);

        let output = entries::synthesize(&self.config, &scanned.components, &routes, generation);
        output.write()?;

        let mut diagnostics = scanned.errors;
        diagnostics.extend(route_errors);
        let cycle = Arc::new(assemble(
            scanned.components,
            routes,
            output,
            diagnostics,
            generation,
        ));
        if let Ok(mut current) = self.current.lock() {
            *current = Some(cycle.clone());
        }

        tracing::debug!(
            generation,
            components = cycle.components.len(),
            routes = cycle.routes.len(),
            diagnostics = cycle.diagnostics.len(),
            "synthesis cycle finished"
        );
        Ok(cycle)
    }
}

fn assemble(
    components: BTreeMap<PathBuf, ComponentInfo>,
    routes: Vec<CompiledRoute>,
    output: SynthesisOutput,
    mut diagnostics: Vec<Diagnostic>,
    generation: u64,
) -> BuildCycle {
    diagnostics.extend(output.errors);
    let mut entries = vec![output.frontend];
    if let Some(backend) = output.backend {
        entries.push(backend);
    }
    BuildCycle {
        generation,
        components,
        routes,
        entries,
        diagnostics,
    }
}
