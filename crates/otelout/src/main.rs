// SPDX-FileCopyrightText: 2026 Otelout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! otelout - forwards k6 load-test samples to an OpenTelemetry collector.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod feed;
mod run;
mod shutdown;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use otelout_config::OteloutConfig;

/// Command-line interface for otelout.
#[derive(Parser, Debug)]
#[command(name = "otelout", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Read a k6 JSON feed and export its samples over OTLP.
    Run {
        /// Configuration file (defaults to the XDG hierarchy).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Feed file written by `k6 run --out json=...` (defaults to stdin).
        #[arg(long)]
        input: Option<PathBuf>,
        /// Samples delivered to the output per call.
        #[arg(long, default_value_t = 100)]
        batch_size: usize,
    },
    /// Print the effective configuration as TOML.
    Config {
        /// Configuration file (defaults to the XDG hierarchy).
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            input,
            batch_size,
        } => {
            let config = load_or_exit(config.as_deref());
            run::init_tracing(&config.output.log_level);
            if let Err(e) = run::run_feed(config, input, batch_size).await {
                eprintln!("otelout: {e}");
                std::process::exit(1);
            }
        }
        Commands::Config { config } => {
            let config = load_or_exit(config.as_deref());
            match config.to_toml_string() {
                Ok(rendered) => print!("{rendered}"),
                Err(e) => {
                    eprintln!("otelout: failed to render configuration: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}

fn load_or_exit(path: Option<&Path>) -> OteloutConfig {
    let loaded = match path {
        Some(path) => otelout_config::load_and_validate_path(path),
        None => otelout_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            otelout_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}
