//! The run context handed to action bodies
//!
//! Everything an action touches at run time comes through here: drive
//! resolution, the transfer engine, the cancellation token, and the
//! interactive prompts. The registry passes the context through without
//! looking inside.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::LazyLock;

use dialoguer::{Confirm, Input, Select};
use regex::Regex;
use tokio_util::sync::CancellationToken;
use tpl_actions::ActionError;
use tpl_fs::DriveMap;
use tpl_transfer::{ProgressSink, TransferEngine};

use crate::progress::TransferProgress;

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").expect("name regex is valid")
});

/// Validation for user-supplied project and document names.
pub(crate) fn is_valid_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

/// Turn an arbitrary string into something that passes name validation.
///
/// Used for prompt defaults derived from directory names, which may carry
/// spaces or umlauts.
pub(crate) fn suggested_name(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('-').to_string();
    if cleaned.is_empty() {
        "project".to_string()
    } else {
        cleaned
    }
}

pub struct RunContext {
    drives: DriveMap,
    engine: TransferEngine,
    cancel: CancellationToken,
    working_dir: PathBuf,
}

impl RunContext {
    pub fn new(drives: DriveMap) -> std::io::Result<Self> {
        Ok(Self {
            drives,
            engine: TransferEngine::new(),
            cancel: CancellationToken::new(),
            working_dir: std::env::current_dir()?,
        })
    }

    pub fn drives(&self) -> &DriveMap {
        &self.drives
    }

    pub fn engine(&self) -> &TransferEngine {
        &self.engine
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// A fresh progress renderer for one transfer operation.
    pub fn progress_sink(&self) -> Arc<dyn ProgressSink> {
        Arc::new(TransferProgress::new())
    }

    /// Let the user pick one of `items`.
    pub fn select(&self, prompt: &str, items: &[String]) -> Result<usize, ActionError> {
        Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()
            .map_err(|e| ActionError::with_source("selection prompt failed", e))
    }

    /// Ask for a name, validated against the project-name rules.
    pub fn input_name(&self, prompt: &str, default: &str) -> Result<String, ActionError> {
        Input::<String>::new()
            .with_prompt(prompt)
            .default(suggested_name(default))
            .validate_with(|input: &String| -> Result<(), &str> {
                if is_valid_name(input) {
                    Ok(())
                } else {
                    Err("names may contain letters, digits, '-' and '_' only")
                }
            })
            .interact_text()
            .map_err(|e| ActionError::with_source("input prompt failed", e))
    }

    /// Ask a yes/no question.
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool, ActionError> {
        Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(|e| ActionError::with_source("confirmation prompt failed", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_names_pass() {
        assert!(is_valid_name("E01-ABC-17_Projekt"));
        assert!(is_valid_name("doc2"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("-leading"));
        assert!(!is_valid_name("has space"));
        assert!(!is_valid_name("umläut"));
    }

    #[test]
    fn suggested_name_sanitizes_input() {
        assert_eq!(suggested_name("My Project (v2)"), "My-Project--v2");
        assert_eq!(suggested_name("///"), "project");
        assert_eq!(suggested_name("fine-name"), "fine-name");
    }

    #[test]
    fn suggested_names_are_valid() {
        for raw in ["My Project (v2)", "///", "fine-name", "ä ö ü"] {
            assert!(is_valid_name(&suggested_name(raw)), "failed for {raw:?}");
        }
    }
}
