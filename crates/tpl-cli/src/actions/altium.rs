//! Altium schematic/layout projects

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use colored::Colorize;
use tpl_actions::{Action, ActionDescriptor, ActionError, Enablement, RegistryBuilder};
use tpl_fs::DriveMap;
use tpl_transfer::CopyOptions;
use walkdir::WalkDir;

use crate::actions::{ALTIUM_TEMPLATES, require_root, root_reachable};
use crate::context::RunContext;
use crate::summary;

const PROJECT_EXTENSION: &str = "PrjPcb";

/// Document extensions renamed together with the project file.
const SIBLING_EXTENSIONS: &[&str] = &["SchDoc", "PcbDoc", "PrjPcbStructure"];

pub fn register(builder: &mut RegistryBuilder<RunContext>, drives: &DriveMap) {
    builder.register(
        ActionDescriptor::new(["Hardware", "Altium"], "New Altium Project", NewAltiumProject)
            .with_description("Create a new Altium project from a schematic/layout template.")
            .with_enablement(root_reachable(drives, ALTIUM_TEMPLATES)),
    );
    builder.register(
        ActionDescriptor::new(["Hardware", "Altium"], "Rename Project", RenameProject)
            .with_description(
                "Rename the Altium project in the current directory, including its documents.",
            )
            .with_enablement(Enablement::dynamic(working_dir_has_project)),
    );
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
}

/// Probe for the rename action: a `.PrjPcb` file next to the user.
fn working_dir_has_project() -> std::io::Result<bool> {
    let cwd = std::env::current_dir()?;
    for entry in std::fs::read_dir(cwd)? {
        if has_extension(&entry?.path(), PROJECT_EXTENSION) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Template directories: any directory under the share that directly
/// contains a project file.
fn template_dirs(root: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| has_extension(entry.path(), PROJECT_EXTENSION))
        .filter_map(|entry| entry.path().parent().map(Path::to_path_buf))
        .collect();
    dirs.sort();
    dirs.dedup();
    dirs
}

struct NewAltiumProject;

#[async_trait]
impl Action<RunContext> for NewAltiumProject {
    async fn run(&self, ctx: &mut RunContext) -> Result<(), ActionError> {
        let root = require_root(ctx, ALTIUM_TEMPLATES)?;

        let templates = template_dirs(&root);
        if templates.is_empty() {
            return Err(ActionError::new(
                "no Altium templates found under the template share",
            ));
        }
        let names: Vec<String> = templates
            .iter()
            .map(|path| {
                path.strip_prefix(&root)
                    .unwrap_or(path)
                    .display()
                    .to_string()
            })
            .collect();
        let choice = ctx.select("Choose the Altium project template", &names)?;
        let template = &templates[choice];

        let cwd_name = ctx
            .working_dir()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = ctx.input_name("Name of the Altium project", &cwd_name)?;

        let mut destination = ctx.working_dir().to_path_buf();
        if ctx.confirm(
            &format!("Create a new folder '{name}' for the project?"),
            true,
        )? {
            destination = destination.join(&name);
        }

        let report = ctx
            .engine()
            .copy_directory(
                template,
                &destination,
                &CopyOptions::default(),
                Some(ctx.progress_sink()),
                ctx.cancel_token(),
            )
            .await
            .map_err(|e| ActionError::with_source("copying the template failed", e))?;
        summary::print_report(&report);

        rename_project_files(&destination, &name)?;
        println!(
            "{} {}",
            "Altium project created at".green().bold(),
            destination.display()
        );
        Ok(())
    }
}

struct RenameProject;

#[async_trait]
impl Action<RunContext> for RenameProject {
    async fn run(&self, ctx: &mut RunContext) -> Result<(), ActionError> {
        let cwd = ctx.working_dir().to_path_buf();
        let project = find_project_file(&cwd)?.ok_or_else(|| {
            ActionError::new("no .PrjPcb file in the current directory")
        })?;
        let old_stem = project
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let name = ctx.input_name("New project name", &old_stem)?;
        if name == old_stem {
            println!("Name unchanged, nothing to do.");
            return Ok(());
        }

        rename_project_files(&cwd, &name)?;
        println!(
            "{} {} -> {}",
            "Renamed project".green().bold(),
            old_stem,
            name
        );
        Ok(())
    }
}

fn find_project_file(dir: &Path) -> Result<Option<PathBuf>, ActionError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| ActionError::with_source(format!("cannot read {}", dir.display()), e))?;
    let mut projects: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| has_extension(path, PROJECT_EXTENSION))
        .collect();
    projects.sort();
    Ok(projects.into_iter().next())
}

/// Give the project file and its documents a new stem.
///
/// The project file's references to renamed documents are rewritten
/// atomically, so a failed rewrite never leaves a half-edited project file.
fn rename_project_files(dir: &Path, new_stem: &str) -> Result<(), ActionError> {
    let project = find_project_file(dir)?
        .ok_or_else(|| ActionError::new("the copied template contains no .PrjPcb file"))?;
    let old_stem = project
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if old_stem == new_stem {
        return Ok(());
    }

    let entries = std::fs::read_dir(dir)
        .map_err(|e| ActionError::with_source(format!("cannot read {}", dir.display()), e))?;
    for entry in entries.filter_map(|entry| entry.ok()) {
        let path = entry.path();
        let renameable = has_extension(&path, PROJECT_EXTENSION)
            || SIBLING_EXTENSIONS.iter().any(|ext| has_extension(&path, ext));
        let matches_stem = path
            .file_stem()
            .is_some_and(|s| s.to_string_lossy() == old_stem);
        if !(renameable && matches_stem) {
            continue;
        }

        let Some(extension) = path.extension() else {
            continue;
        };
        let target = dir.join(format!("{}.{}", new_stem, extension.to_string_lossy()));
        std::fs::rename(&path, &target).map_err(|e| {
            ActionError::with_source(format!("failed to rename {}", path.display()), e)
        })?;
    }

    // The project file moved with the loop above; rewrite its document
    // references under the new name.
    let project = dir.join(format!("{new_stem}.{PROJECT_EXTENSION}"));
    let content = std::fs::read_to_string(&project).map_err(|e| {
        ActionError::with_source(format!("cannot read {}", project.display()), e)
    })?;
    let updated = content.replace(old_stem.as_str(), new_stem);
    tpl_fs::io::write_atomic(&project, updated.as_bytes())
        .map_err(|e| ActionError::with_source("failed to rewrite the project file", e))?;
    Ok(())
}
