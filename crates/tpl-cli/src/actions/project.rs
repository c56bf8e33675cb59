//! Project folder skeleton

use async_trait::async_trait;
use colored::Colorize;
use tpl_actions::{Action, ActionDescriptor, ActionError, RegistryBuilder};
use tpl_fs::DriveMap;
use tpl_transfer::CopyOptions;

use crate::actions::{PROJECT_SKELETON, require_root, root_reachable};
use crate::context::RunContext;
use crate::summary;

pub fn register(builder: &mut RegistryBuilder<RunContext>, drives: &DriveMap) {
    builder.register(
        ActionDescriptor::new(["Projects"], "New Project Folder", NewProjectFolder)
            .with_description(
                "Materialize the standard project directory structure under a new name.",
            )
            .with_enablement(root_reachable(drives, PROJECT_SKELETON)),
    );
}

struct NewProjectFolder;

#[async_trait]
impl Action<RunContext> for NewProjectFolder {
    async fn run(&self, ctx: &mut RunContext) -> Result<(), ActionError> {
        let skeleton = require_root(ctx, PROJECT_SKELETON)?;

        let cwd_name = ctx
            .working_dir()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = ctx.input_name("Project name", &cwd_name)?;

        let destination = ctx.working_dir().join(&name);
        if destination.exists() {
            return Err(ActionError::new(format!(
                "{} already exists in this directory",
                name
            )));
        }

        if !ctx.confirm(
            &format!("Create the project structure under ./{name}?"),
            true,
        )? {
            println!("Aborted, nothing was created.");
            return Ok(());
        }

        let report = ctx
            .engine()
            .copy_directory(
                &skeleton,
                &destination,
                &CopyOptions::default(),
                Some(ctx.progress_sink()),
                ctx.cancel_token(),
            )
            .await
            .map_err(|e| ActionError::with_source("copying the project skeleton failed", e))?;

        summary::print_report(&report);
        println!(
            "{} {}",
            "Project created at".green().bold(),
            destination.display()
        );
        Ok(())
    }
}
