// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

use basys::json5::SYNTAX_HELP;
use basys::ConfigError;
use basys_cli::commands;
use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "basys")]
#[command(author = "Maravilla Labs")]
#[command(version)]
#[command(about = "Project scaffolding and build orchestration", long_about = None)]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Verbose mode: debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: only show errors (useful for CI)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the development session with file watching
    Dev {
        /// App to work on (may be omitted when the manifest declares one app)
        #[arg(short, long)]
        app: Option<String>,
        /// Project root containing basys.json
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },
    /// Synthesize entries for production
    Build {
        /// App to build (may be omitted when the manifest declares one app)
        #[arg(short, long)]
        app: Option<String>,
        /// Project root containing basys.json
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing with the specified log level
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        cli.log_level.as_str()
    };
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match &cli.command {
        Commands::Dev { app, project_dir } => {
            commands::dev::run(app.as_deref(), project_dir, cli.quiet).await
        }
        Commands::Build { app, project_dir } => {
            commands::build::run(app.as_deref(), project_dir, cli.quiet).await
        }
    };

    if let Err(e) = result {
        eprintln!("{} {e:#}", style("Error:").red().bold());
        if matches!(
            e.downcast_ref::<ConfigError>(),
            Some(ConfigError::ManifestSyntax { .. })
        ) {
            eprintln!("\n{SYNTAX_HELP}");
        }
        std::process::exit(1);
    }
}
