//! Template Manager CLI
//!
//! Interactive command-line tool for browsing template actions and running
//! one of them against the current working directory.

mod actions;
mod cli;
mod context;
mod error;
mod menu;
mod progress;
mod summary;

use clap::Parser;
use colored::Colorize;
use serde::Serialize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use context::RunContext;
use error::Result;
use tpl_fs::DriveMap;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    }

    let drives = cli.drive_map()?;
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => cmd_run(drives),
        Commands::List { json } => cmd_list(&drives, json),
        Commands::Paths => cmd_paths(&drives),
    }
}

fn cmd_run(drives: DriveMap) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        warn_unreachable_roots(&drives);

        let tree = actions::action_tree(&drives)?;
        let mut ctx = RunContext::new(drives)?;

        // Ctrl-C stops admission of queued transfer items; in-flight items
        // abort at their next I/O checkpoint.
        let cancel = ctx.cancel_token().clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });

        println!(
            "Working directory: {}",
            ctx.working_dir().display().to_string().yellow()
        );
        menu::browse_and_run(tree, &mut ctx).await
    })
}

#[derive(Serialize)]
struct ListedAction {
    name: String,
    category: Vec<String>,
    description: String,
    enabled: bool,
}

fn cmd_list(drives: &DriveMap, json: bool) -> Result<()> {
    let tree = actions::action_tree(drives)?;
    let (enabled_tree, _) = tree.enabled();
    let enabled_keys: std::collections::HashSet<(Vec<String>, String)> = enabled_tree
        .actions()
        .iter()
        .map(|a| (a.qualified_path().to_vec(), a.display_name().to_string()))
        .collect();

    let listed: Vec<ListedAction> = tree
        .actions()
        .iter()
        .map(|action| ListedAction {
            name: action.display_name().to_string(),
            category: action.qualified_path().to_vec(),
            description: action.description().to_string(),
            enabled: enabled_keys.contains(&(
                action.qualified_path().to_vec(),
                action.display_name().to_string(),
            )),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&listed)?);
        return Ok(());
    }

    println!("{}", "Registered Actions".bold());
    println!();
    for action in &listed {
        let marker = if action.enabled {
            "enabled".green()
        } else {
            "disabled".dimmed()
        };
        println!(
            "  {:<32} {:<24} [{}]",
            action.name.cyan(),
            action.category.join("/"),
            marker
        );
    }
    println!();
    println!(
        "{} {} actions registered.",
        "Total:".dimmed(),
        listed.len()
    );
    Ok(())
}

fn cmd_paths(drives: &DriveMap) -> Result<()> {
    println!("{}", "Mapped Drive Roots".bold());
    println!();
    let statuses = drives.check_roots();
    let mut all_good = true;
    for status in &statuses {
        let marker = if status.reachable {
            "ok".green().bold()
        } else {
            all_good = false;
            "unreachable".red().bold()
        };
        println!(
            "  {}: {:<40} [{}]",
            status.letter,
            status.root.display(),
            marker
        );
    }
    println!();
    if !all_good {
        println!(
            "{}",
            "Some shares are not reachable; actions that need them will be hidden.".yellow()
        );
    }
    Ok(())
}

fn warn_unreachable_roots(drives: &DriveMap) {
    for status in drives.check_roots() {
        if !status.reachable {
            eprintln!(
                "{} drive {}: {} is not reachable",
                "warning:".yellow().bold(),
                status.letter,
                status.root.display()
            );
        }
    }
}
