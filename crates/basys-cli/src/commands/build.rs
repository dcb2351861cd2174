// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Build command: one-shot synthesis for production.

use basys::config::{resolve, Env};
use basys::Pipeline;
use console::style;
use std::path::Path;
use std::time::Instant;

/// Runs one production synthesis cycle and reports its diagnostics.
///
/// Per-component diagnostics do not fail the build; only fatal
/// configuration errors exit non-zero.
pub async fn run(app: Option<&str>, project_dir: &Path, quiet: bool) -> anyhow::Result<()> {
    let config = resolve(project_dir, app, Env::Prod)?;
    if !quiet {
        println!(
            "{} {} ({})",
            style("Building:").cyan(),
            style(&config.app_name).bold(),
            config.kind
        );
    }

    let pipeline = Pipeline::new(config);
    let start = Instant::now();
    let cycle = pipeline.run_cycle().await?;

    for diagnostic in &cycle.diagnostics {
        eprintln!("  {} {}", style("⚠").yellow(), diagnostic);
    }

    if !quiet {
        println!(
            "  {} {} {}",
            style("✓").green(),
            style(format!(
                "{} components, {} routes",
                cycle.components.len(),
                cycle.routes.len()
            ))
            .dim(),
            style(format!("{}ms", start.elapsed().as_millis())).dim()
        );
        println!(
            "{} {}",
            style("Output:").cyan(),
            pipeline.config().temp_dir.display()
        );
    }
    Ok(())
}
