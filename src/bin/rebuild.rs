// Copyright (c) 2026-present, xdg-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Rebuilds the `applications.cache` file in every resolved
//! `applications/` folder, the CLI entry point for forcing a refresh
//! outside of whatever process would otherwise trigger one lazily.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use xdg_index::{base_directories, Config, Library};

/// Rebuild the desktop-entry application cache.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Overrides `$XDG_DATA_HOME`.
    #[arg(long)]
    data_home: Option<PathBuf>,

    /// Overrides `$XDG_DATA_DIRS` (`:`-separated).
    #[arg(long, value_delimiter = ':')]
    data_dirs: Option<Vec<PathBuf>>,

    /// Print the folders that were scanned and how many apps were found.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let mut config = Config::default();
    if let Some(data_home) = args.data_home {
        config = config.data_home(data_home);
    }
    if let Some(data_dirs) = args.data_dirs {
        config = config.data_dirs(data_dirs);
    }

    let base_dirs = base_directories(&config);
    match Library::open(config) {
        Ok(_library) => {
            if args.verbose {
                for dir in &base_dirs {
                    println!("rebuilt cache for {}", dir.display());
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("xdg-index-rebuild: {e}");
            ExitCode::FAILURE
        }
    }
}
