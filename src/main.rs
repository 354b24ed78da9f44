// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! spacey-pack - CommonJS bundler for the Spacey toolchain
//!
//! ## Commands
//!
//! - `serve`: answer `/<mount>/<hash>.js` requests from the bundle store
//! - `build`: mint the bundle for a list of modules and print its URL
//! - `prelude`: print the loader prelude

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{BuildArgs, Cli, Commands, ServeArgs};
use owo_colors::OwoColorize;
use spacey_bundle::{App, Config, StoreKind};
use spacey_bundle_server::{BundleHandler, BundleServer};
use std::io::Write;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    let level = if cli.verbose { "debug" } else { config.loglevel.as_str() };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    let result = match cli.command {
        Commands::Serve(args) => run_serve(&config, args),
        Commands::Build(args) => run_build(&config, args),
        Commands::Prelude => run_prelude(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Config file and environment, then command line flags on top.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref()).context("failed to load config")?;

    if !cli.module_dirs.is_empty() {
        config.module_dirs = cli.module_dirs.clone();
    }
    if let Some(mount_path) = &cli.mount_path {
        config.mount_path = mount_path.clone();
    }
    if let Some(minify) = &cli.minify {
        config.set("minify", minify)?;
    }
    if let Some(dir) = &cli.store_dir {
        config.store = StoreKind::Dir;
        config.store_dir = Some(dir.clone());
    }

    Ok(config)
}

fn run_serve(config: &Config, args: ServeArgs) -> Result<()> {
    let app = App::from_config(config)?;

    for list in &args.warm {
        let names: Vec<&str> = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        let url = app
            .modules_url(&names)
            .with_context(|| format!("failed to bundle {list}"))?;
        info!("Minted {} for {}", url, list);
    }

    if config.store == StoreKind::Memory && args.warm.is_empty() {
        warn!("Serving an empty memory store; pass --warm or use a dir store");
    }

    let listen = args.listen.unwrap_or_else(|| config.listen.clone());
    let server = BundleServer::new(BundleHandler::new(app.store()));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    runtime.block_on(async move {
        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for ctrl-c: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Shutting down");
        };
        server.bind_and_serve(&listen, shutdown).await
    })?;

    Ok(())
}

fn run_build(config: &Config, args: BuildArgs) -> Result<()> {
    let app = App::from_config(config)?;
    let url = app.modules_url(&args.modules)?;
    println!("{url}");

    if args.emit {
        let key = url
            .rsplit('/')
            .next()
            .and_then(|base| base.strip_suffix(spacey_bundle::store::EXTENSION))
            .unwrap_or_default();
        let bundle = app
            .store()
            .get(key)?
            .with_context(|| format!("bundle {key} missing from store"))?;
        std::io::stdout().write_all(&bundle)?;
    }

    Ok(())
}

fn run_prelude(config: &Config) -> Result<()> {
    let app = App::from_config(config)?;
    let prelude = app.script_prelude()?;
    std::io::stdout().write_all(&prelude)?;
    Ok(())
}
