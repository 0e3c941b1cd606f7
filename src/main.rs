//! # vcxpatch: The Main Entry Point
//!
//! This module handles Command Line Interface (CLI) parsing, logging
//! initialization, and dispatching commands to the appropriate sub-modules.
//!
//! vcxpatch is an installer helper: it walks a vendored package directory,
//! finds the Visual Studio project files belonging to one third-party library,
//! and rewrites them to build with a pinned toolchain. Nothing runs as a side
//! effect of loading the binary; every action is behind an explicit subcommand.

use std::path::{Path, PathBuf};
use clap::{Parser, Subcommand};
use log::{error, info, LevelFilter};
use simplelog::{Config, SimpleLogger};

mod discovery;
mod invariant_ppt;
mod patcher;
mod system;

/// The primary Command Line Interface (CLI) configuration.
///
/// Uses `clap` for sub-command parsing and help generation. All knobs default
/// to the values the installer ships with, so a bare `vcxpatch patch` does the
/// standard thing.
#[derive(Parser)]
#[command(name = "vcxpatch")]
#[command(about = "Pins vendored Visual Studio project files to a known-good toolchain", long_about = None)]
struct Cli {
    /// The sub-command to execute (patch, doctor).
    #[command(subcommand)]
    command: Option<Commands>,

    /// Turn on verbose logging.
    ///
    /// - `-v`: Debug
    /// - `-vv`: Trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Directory to scan. Defaults to `packages/<project>` next to the executable.
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Project token a file name must contain (case-insensitive).
    #[arg(long, default_value = "reactphysics3d")]
    project: String,

    /// Project-file extension a file name must end with (case-insensitive).
    #[arg(long, default_value = ".vcxproj")]
    extension: String,

    /// Windows SDK version written between the target-platform tags.
    #[arg(long, default_value = "10.0.17763.0")]
    platform_version: String,

    /// C++ language standard injected after each compile-options tag.
    #[arg(long, default_value = "stdcpp17")]
    standard: String,
}

/// Available sub-commands for the vcxpatch utility.
#[derive(Subcommand)]
enum Commands {
    /// Find matching project files and rewrite them once.
    ///
    /// This command will:
    /// 1. Strip every bare <PropertyGroup> block.
    /// 2. Inject the language-standard element after each <ClCompile> tag.
    /// 3. Pin the Windows target platform version.
    Patch {
        /// Dry run: report what would be rewritten without touching any file.
        #[arg(long)]
        dry_run: bool,
    },
    /// Inspect matching project files and report issues.
    ///
    /// Checks for:
    /// - Property-group blocks still present.
    /// - Compile sections missing (or stacking) the language standard.
    /// - Target platform versions that differ from the pin.
    Doctor,
}

fn main() {
    let cli = Cli::parse();

    // Determine log level based on verbosity flag
    let log_level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    // Initialize logger
    // We ignore the result here as logging failure shouldn't crash the startup
    let _ = SimpleLogger::init(log_level, Config::default());

    let base_dir = cli.dir.clone().unwrap_or_else(|| default_base_dir(&cli.project));
    let rules = patcher::PatchRules::new(&cli.standard, &cli.platform_version);

    match &cli.command {
        Some(Commands::Patch { dry_run }) => {
            info!("Patching {:?} project files under {:?}...", cli.project, base_dir);
            let run = discovery::discover_candidates(&base_dir, &cli.project, &cli.extension)
                .and_then(|candidates| {
                    patcher::run_patch(&candidates, &rules, &system::DiskFiles, *dry_run)
                });
            match run {
                Ok(summary) => {
                    if *dry_run {
                        info!(
                            "Dry run complete: {} file(s) would change, {} already up to date",
                            summary.patched.len(),
                            summary.unchanged.len()
                        );
                    } else {
                        info!(
                            "Patched {} file(s), {} already up to date",
                            summary.patched.len(),
                            summary.unchanged.len()
                        );
                    }
                }
                Err(e) => {
                    error!("Failed to patch project files: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Doctor) => {
            let run = discovery::discover_candidates(&base_dir, &cli.project, &cli.extension)
                .and_then(|candidates| patcher::doctor(&candidates, &rules, &system::DiskFiles));
            if let Err(e) = run {
                error!("Doctor check failed: {}", e);
            }
        }
        None => {
            // Default behavior if no command: print the help message
            use clap::CommandFactory;
            let _ = Cli::command().print_help();
        }
    }
}

/// Resolves the default package directory: `packages/<project>` next to the
/// running executable, matching where the installer vendors third-party code.
fn default_base_dir(project: &str) -> PathBuf {
    let exe = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("."));
    exe.parent()
        .unwrap_or(Path::new("."))
        .join("packages")
        .join(project)
}
