//! Built-in actions
//!
//! Each module registers its actions explicitly; the directory layout of
//! the template shares only shows up as the category path under which an
//! action is filed. The assembled tree is a process-wide snapshot built
//! exactly once.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tpl_actions::{ActionError, ActionTree, Enablement, RegistryBuilder};
use tpl_fs::DriveMap;

use crate::context::RunContext;
use crate::error::Result;

pub mod altium;
pub mod obsidian;
pub mod office;
pub mod project;
pub mod uvision;

// Template locations on the mapped school share.
pub(crate) const OFFICE_TEMPLATES: &str = r"T:\E\LIVE\02_Vorlagen\01_Office";
pub(crate) const PROJECT_SKELETON: &str =
    r"T:\E\LIVE\02_Vorlagen\03_Projektordnerstruktur\EXX-YYY-ZZ_Projektname";
pub(crate) const ALTIUM_TEMPLATES: &str = r"T:\E\LIVE\05_HW_Entwicklung\02_Vorlage_Schema_Layout";
pub(crate) const UVISION_TEMPLATES: &str = r"T:\E\LIVE\06_SW_Entwicklung\11_Vorlagen";

static TREE: OnceLock<ActionTree<RunContext>> = OnceLock::new();

/// The action tree, built on first use and shared for the process lifetime.
pub fn action_tree(drives: &DriveMap) -> Result<&'static ActionTree<RunContext>> {
    if let Some(tree) = TREE.get() {
        return Ok(tree);
    }
    let mut builder = RegistryBuilder::new();
    register_builtins(&mut builder, drives);
    let tree = builder.build()?;
    Ok(TREE.get_or_init(|| tree))
}

/// Register every built-in action.
pub fn register_builtins(builder: &mut RegistryBuilder<RunContext>, drives: &DriveMap) {
    office::register(builder, drives);
    project::register(builder, drives);
    altium::register(builder, drives);
    uvision::register(builder, drives);
    obsidian::register(builder, drives);
}

/// Enablement probe: the given template root resolves and is reachable.
pub(crate) fn root_reachable(drives: &DriveMap, raw: &'static str) -> Enablement {
    let drives = drives.clone();
    Enablement::dynamic(move || {
        drives
            .resolve(raw)
            .map(|resolved| resolved.exists)
            .map_err(std::io::Error::other)
    })
}

/// Files directly inside `dir`, sorted by name.
pub(crate) fn list_files(dir: &Path) -> std::result::Result<Vec<PathBuf>, ActionError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| ActionError::with_source(format!("cannot read {}", dir.display()), e))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Directories directly inside `dir`, sorted by name.
pub(crate) fn list_dirs(dir: &Path) -> std::result::Result<Vec<PathBuf>, ActionError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| ActionError::with_source(format!("cannot read {}", dir.display()), e))?;
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

/// Resolve a template root and insist it is reachable.
pub(crate) fn require_root(
    ctx: &RunContext,
    raw: &str,
) -> std::result::Result<PathBuf, ActionError> {
    let resolved = ctx
        .drives()
        .resolve(raw)
        .map_err(|e| ActionError::with_source("failed to resolve template share", e))?;
    if !resolved.exists {
        return Err(ActionError::new(format!(
            "template share {} is not reachable right now",
            resolved.real.display()
        )));
    }
    Ok(resolved.real)
}
