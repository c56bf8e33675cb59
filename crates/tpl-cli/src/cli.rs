//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};
use tpl_fs::DriveMap;

use crate::error::{CliError, Result};

/// Template Manager - browse and run project template actions
#[derive(Parser, Debug)]
#[command(name = "tpl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override a drive mapping (repeatable), e.g. -m T=/mnt/templates
    #[arg(short = 'm', long = "map", global = true, value_name = "LETTER=PATH")]
    pub map: Vec<String>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Browse the action tree and run one action (the default)
    Run,

    /// List registered actions with their current availability
    List {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Check whether the mapped drive roots are reachable
    Paths,
}

impl Cli {
    /// The drive map after applying `--map` overrides to the builtin table.
    pub fn drive_map(&self) -> Result<DriveMap> {
        let mut drives = DriveMap::builtin();
        for raw in &self.map {
            let (letter, root) = parse_mapping(raw)?;
            drives = drives.with_mapping(letter, root);
        }
        Ok(drives)
    }
}

/// Parse one `LETTER=PATH` override.
fn parse_mapping(raw: &str) -> Result<(char, &str)> {
    let Some((letter, root)) = raw.split_once('=') else {
        return Err(CliError::user(format!(
            "invalid mapping {raw:?}: expected LETTER=PATH"
        )));
    };
    let mut chars = letter.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) if letter.is_ascii_alphabetic() && !root.is_empty() => {
            Ok((letter, root))
        }
        _ => Err(CliError::user(format!(
            "invalid mapping {raw:?}: drive must be a single letter and the path non-empty"
        ))),
    }
}
