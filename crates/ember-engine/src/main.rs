//! # Ember Engine
//!
//! Headless runner for Project Ember.
//!
//! Loads the engine config and content tables, places the player and the
//! configured enemies in an open field, and lets an autopilot play for a
//! fixed number of simulation steps.
//!
//! Usage: `ember [CONFIG]` runs the scenario in CONFIG (default `ember.toml`).
//! `ember --init [CONFIG]` writes a default config there and exits.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod config;
mod content;
mod demo;
mod timing;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{EngineConfig, CONFIG_FILE};

/// Main entry point.
fn main() -> Result<()> {
    let mut args = std::env::args().skip(1).peekable();
    let init = args.next_if(|arg| arg == "--init").is_some();
    let config_path = args.next().map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);

    if init {
        return EngineConfig::default()
            .save_to(&config_path)
            .with_context(|| format!("writing {}", config_path.display()));
    }

    let config = EngineConfig::load_from(&config_path);

    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    info!("Project Ember starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    app::run(&config_path, &config)?;

    info!("Project Ember shutdown complete");
    Ok(())
}
