// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Development session: initial synthesis, then watch and regenerate.

use anyhow::Context;
use basys::config::{resolve, Env, ResolvedConfig};
use basys::{ChangeBatch, ChangeWatcher, Pipeline};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::artifacts;
use crate::ports;

/// Runs the development session until Ctrl+C.
pub async fn run(app: Option<&str>, project_dir: &Path, quiet: bool) -> anyhow::Result<()> {
    let mut config = resolve(project_dir, app, Env::Dev)?;

    // The configured ports are starting points; take the next free ones and
    // patch them into the resolved snapshot before anything is written.
    let port = ports::find_free_port(&config.host, config.port)?;
    let backend_port = match config.backend_port {
        Some(start) => {
            let start = if start == port { start + 1 } else { start };
            Some(ports::find_free_port(&config.host, start)?)
        }
        None => None,
    };
    config.patch_ports(port, backend_port);
    tracing::info!(app = %config.app_name, port, backend_port, "development session starting");
    publish_session_artifacts(&config)?;

    let app_name = config.app_name.clone();
    let host = config.host.clone();
    let src_dir = config.src_dir();
    let mut pipeline = Arc::new(Pipeline::new(config));

    // The initial cycle must succeed; later cycles report and keep watching.
    report_cycle(pipeline.run_cycle().await?, None, quiet);

    if !quiet {
        println!(
            "{} {}",
            style("Dev server:").cyan(),
            style(format!("http://{host}:{port}")).green().bold()
        );
        println!(
            "{} {} ({})",
            style("App:").cyan(),
            style(&app_name).bold(),
            pipeline.config().kind
        );
        println!(
            "{} {}",
            style("Status:").cyan(),
            style("Watching for changes...").dim()
        );
        println!();
    }

    let (_component_watch, mut component_rx) = ChangeWatcher::components(&src_dir)
        .with_context(|| format!("failed to watch {}", src_dir.display()))?;
    let (_manifest_watch, mut manifest_rx) = ChangeWatcher::manifest(project_dir)
        .with_context(|| format!("failed to watch {}", project_dir.display()))?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                if !quiet {
                    println!("{}", style("Shutting down.").dim());
                }
                break;
            }

            Some(batch) = component_rx.recv() => {
                let batch = drain_batches(&mut component_rx, batch);
                if !needs_cycle(&pipeline, &batch) {
                    continue;
                }
                run_watched_cycle(&pipeline, &batch, quiet).await;
            }

            Some(_) = manifest_rx.recv() => {
                while manifest_rx.try_recv().is_ok() {}
                match resolve(project_dir, Some(&app_name), Env::Dev) {
                    Ok(mut next) => {
                        next.patch_ports(port, backend_port);
                        if let Err(e) = publish_session_artifacts(&next) {
                            eprintln!("  {} {e:#}", style("✗").red());
                            continue;
                        }
                        pipeline = Arc::new(Pipeline::new(next));
                        let batch = ChangeBatch::default();
                        run_watched_cycle(&pipeline, &batch, quiet).await;
                    }
                    Err(e) => {
                        // Keep the session alive on the previous snapshot.
                        eprintln!(
                            "  {} {}",
                            style("✗").red(),
                            style(format!("manifest reload failed: {e}")).red()
                        );
                    }
                }
            }
        }
    }

    Ok(())
}

/// Rewrites the session artifacts the dev server and app builder consume.
fn publish_session_artifacts(config: &ResolvedConfig) -> anyhow::Result<()> {
    artifacts::write_dev_server_config(config)?;
    artifacts::write_app_builder_config(config)?;
    Ok(())
}

/// Coalesces every already-queued batch into one before a cycle starts.
fn drain_batches(rx: &mut UnboundedReceiver<ChangeBatch>, mut batch: ChangeBatch) -> ChangeBatch {
    while let Ok(more) = rx.try_recv() {
        batch.changed.extend(more.changed);
        batch.removed.extend(more.removed);
    }
    batch
}

/// Whether a batch warrants a new cycle.
///
/// Removals of files that were never in the current registry are skipped.
fn needs_cycle(pipeline: &Pipeline, batch: &ChangeBatch) -> bool {
    !batch.changed.is_empty()
        || batch
            .removed
            .iter()
            .any(|path| pipeline.is_registered(path))
}

/// Runs one watched cycle with a spinner and prints its outcome.
async fn run_watched_cycle(pipeline: &Pipeline, batch: &ChangeBatch, quiet: bool) {
    let display = batch
        .changed
        .iter()
        .chain(batch.removed.iter())
        .map(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| p.display().to_string())
        })
        .collect::<Vec<_>>()
        .join(", ");

    let spinner = if quiet {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        if let Ok(template) = ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}")
        {
            pb.set_style(template);
        }
        pb.set_message(if display.is_empty() {
            "regenerating".to_string()
        } else {
            display.clone()
        });
        pb.enable_steady_tick(Duration::from_millis(80));
        Some(pb)
    };

    let start = Instant::now();
    match pipeline.run_cycle().await {
        Ok(cycle) => {
            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }
            let trigger = format!("{display} {}ms", start.elapsed().as_millis());
            report_cycle(cycle, Some(trigger.trim()), quiet);
        }
        Err(e) => {
            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }
            eprintln!(
                "  {} {}",
                style("✗").red(),
                style(format!("synthesis failed: {e}")).red()
            );
        }
    }
}

/// Prints one finished cycle: a ✓ line plus its diagnostics.
fn report_cycle(cycle: Arc<basys::BuildCycle>, trigger: Option<&str>, quiet: bool) {
    for diagnostic in &cycle.diagnostics {
        eprintln!("  {} {}", style("⚠").yellow(), diagnostic);
    }
    if quiet {
        return;
    }
    let summary = format!(
        "{} components, {} routes",
        cycle.components.len(),
        cycle.routes.len()
    );
    match trigger {
        Some(trigger) => println!(
            "  {} {} {}",
            style("✓").green(),
            style(trigger).dim(),
            style(summary).dim()
        ),
        None => println!("  {} {}", style("✓").green(), style(summary).dim()),
    }
}
