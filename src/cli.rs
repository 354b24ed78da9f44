// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! CLI argument parsing for spacey-pack.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// spacey-pack - CommonJS bundler and content-addressed bundle server
#[derive(Parser, Debug)]
#[command(name = "spacey-pack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: ./spacey-pack.toml if present)
    #[arg(short, long, global = true, env = "SPACEY_PACK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory searched for `<name>.js` modules (repeatable)
    #[arg(short = 'd', long = "module-dir", global = true)]
    pub module_dirs: Vec<PathBuf>,

    /// URL path bundles are served under
    #[arg(long, global = true)]
    pub mount_path: Option<String>,

    /// Minifier: none, jsmin or closure
    #[arg(long, global = true)]
    pub minify: Option<String>,

    /// Keep bundles as files in this directory instead of memory
    #[arg(long, global = true)]
    pub store_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve bundles over HTTP
    Serve(ServeArgs),

    /// Mint the bundle URL for a list of modules
    Build(BuildArgs),

    /// Print the loader prelude
    Prelude,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(short, long)]
    pub listen: Option<String>,

    /// Comma separated module lists to mint before serving (repeatable)
    #[arg(short, long = "warm", value_name = "MODULES")]
    pub warm: Vec<String>,
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Root module names
    #[arg(required = true)]
    pub modules: Vec<String>,

    /// Also print the bundle itself
    #[arg(long)]
    pub emit: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build() {
        let cli = Cli::parse_from(["spacey-pack", "-d", "js", "build", "a/foo", "bar", "--emit"]);
        assert_eq!(cli.module_dirs, vec![PathBuf::from("js")]);
        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.modules, vec!["a/foo", "bar"]);
                assert!(args.emit);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::parse_from([
            "spacey-pack",
            "serve",
            "--listen",
            "0.0.0.0:9000",
            "--warm",
            "a,b",
            "--minify",
            "jsmin",
        ]);
        assert_eq!(cli.minify.as_deref(), Some("jsmin"));
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.listen.as_deref(), Some("0.0.0.0:9000"));
                assert_eq!(args.warm, vec!["a,b"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_build_requires_modules() {
        assert!(Cli::try_parse_from(["spacey-pack", "build"]).is_err());
    }
}
