//! CLI definitions and command routing.

use anyhow::Result;
use clap::{Arg, ArgAction, CommandFactory, FromArgMatches, Parser, Subcommand};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::address::validate_address;
use crate::config::HostsPaths;
use crate::domain::validate_domains;
use crate::hosts::RemoveTarget;
use crate::installer::{ADD_ALIAS, RM_ALIAS};
use crate::platform::ensure_elevated;

#[derive(Parser)]
#[command(name = "hostedit")]
#[command(about = "Add, remove, list and search hosts file entries")]
#[command(version, disable_version_flag = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose mode (debug output)
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add an entry: address followed by one or more hostnames
    Add {
        address: String,
        #[arg(required = true, num_args = 1..)]
        domains: Vec<String>,
    },
    /// Remove entries by position, address or domain (in that order of precedence)
    Rm { target: String },
    /// List entries with their positions
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Case-insensitive search across entries
    Search { query: String },
    /// Add every `address domain...` line from a file
    Batch { file: PathBuf },
    /// List backups of the hosts file, oldest first
    Backups,
    /// Install hostedit (with hostadd/hostrm aliases) into the install dir
    Install,
    /// Download and replace the installed executable from update_url
    Update,
    /// Remove the installed executable and aliases
    Uninstall,
}

/// Full command with `-v/--version`.
pub fn command() -> clap::Command {
    Cli::command().arg(
        Arg::new("version")
            .short('v')
            .long("version")
            .action(ArgAction::Version)
            .help("Print version"),
    )
}

/// Rewrite argv when invoked as `hostadd` or `hostrm`.
pub fn expand_invocation(mut args: Vec<OsString>) -> Vec<OsString> {
    let verb = args
        .first()
        .and_then(|a| Path::new(a).file_stem())
        .and_then(|s| s.to_str())
        .and_then(|name| match name {
            ADD_ALIAS => Some("add"),
            RM_ALIAS => Some("rm"),
            _ => None,
        });
    if let Some(verb) = verb {
        args.insert(1, OsString::from(verb));
    }
    args
}

/// Parse arguments (after alias expansion).
pub fn parse_from(args: Vec<OsString>) -> Result<Cli, clap::Error> {
    let matches = command().try_get_matches_from(expand_invocation(args))?;
    Cli::from_arg_matches(&matches)
}

fn init_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Run CLI and dispatch to handlers.
pub fn run() -> Result<()> {
    let cli = match parse_from(std::env::args_os().collect()) {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };
    init_logging(&cli)?;
    let paths = HostsPaths::default_paths()?;
    dispatch(&paths, cli.command)
}

/// Execute one command against resolved paths.
pub fn dispatch(paths: &HostsPaths, command: Commands) -> Result<()> {
    match command {
        Commands::Add { address, domains } => cmd_add(paths, &address, &domains.join(" ")),
        Commands::Rm { target } => cmd_rm(paths, &target),
        Commands::List { json } => cmd_list(paths, json),
        Commands::Search { query } => {
            for entry in paths.store().search(&query)? {
                println!("{}\t{}", entry.position, entry.line);
            }
            Ok(())
        }
        Commands::Batch { file } => cmd_batch(paths, &file),
        Commands::Backups => {
            for backup in paths.store().backups().list_backups()? {
                println!("{}", backup.display());
            }
            Ok(())
        }
        Commands::Install => {
            ensure_elevated(paths.require_root)?;
            let dest = crate::installer::install(paths)?;
            println!("Installed: {}", dest.display());
            Ok(())
        }
        Commands::Update => {
            ensure_elevated(paths.require_root)?;
            let dest = crate::installer::update(paths)?;
            println!("Updated: {}", dest.display());
            Ok(())
        }
        Commands::Uninstall => {
            ensure_elevated(paths.require_root)?;
            for path in crate::installer::uninstall(paths)? {
                println!("Removed: {}", path.display());
            }
            Ok(())
        }
    }
}

fn cmd_add(paths: &HostsPaths, address: &str, domains: &str) -> Result<()> {
    validate_address(address)?;
    validate_domains(domains)?;
    ensure_elevated(paths.require_root)?;
    let change = paths.store().add(address, domains)?;
    info!("backup saved to {}", change.backup.path.display());
    println!("Added: {}", change.outcome);
    Ok(())
}

fn cmd_rm(paths: &HostsPaths, target: &str) -> Result<()> {
    let target = RemoveTarget::parse(target)?;
    ensure_elevated(paths.require_root)?;
    let change = paths.store().remove(&target)?;
    info!("backup saved to {}", change.backup.path.display());
    for line in &change.outcome {
        println!("Removed: {line}");
    }
    Ok(())
}

fn cmd_list(paths: &HostsPaths, json: bool) -> Result<()> {
    let entries = paths.store().list()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    for entry in entries {
        println!("{}\t{}", entry.position, entry.line);
    }
    Ok(())
}

fn cmd_batch(paths: &HostsPaths, file: &Path) -> Result<()> {
    ensure_elevated(paths.require_root)?;
    let summary = crate::batch::import(&paths.store(), file)?;
    for failure in summary.failures() {
        if let Err(e) = &failure.result {
            println!("line {}: {e}", failure.line_no);
        }
    }
    println!(
        "Batch complete: success={}, failed={}",
        summary.succeeded, summary.failed
    );
    Ok(())
}
