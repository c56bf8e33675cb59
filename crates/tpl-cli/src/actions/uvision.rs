//! uVision firmware projects

use async_trait::async_trait;
use colored::Colorize;
use tpl_actions::{Action, ActionDescriptor, ActionError, RegistryBuilder};
use tpl_fs::DriveMap;
use tpl_transfer::CopyOptions;

use crate::actions::{UVISION_TEMPLATES, list_dirs, require_root, root_reachable};
use crate::context::RunContext;
use crate::summary;

pub fn register(builder: &mut RegistryBuilder<RunContext>, drives: &DriveMap) {
    builder.register(
        ActionDescriptor::new(["Firmware", "uVision"], "New uVision Project", NewUvisionProject)
            .with_description("Copy a uVision project template into the current directory.")
            .with_enablement(root_reachable(drives, UVISION_TEMPLATES)),
    );
}

struct NewUvisionProject;

#[async_trait]
impl Action<RunContext> for NewUvisionProject {
    async fn run(&self, ctx: &mut RunContext) -> Result<(), ActionError> {
        let root = require_root(ctx, UVISION_TEMPLATES)?;

        let templates = list_dirs(&root)?;
        if templates.is_empty() {
            return Err(ActionError::new(
                "no uVision templates found under the template share",
            ));
        }
        let names: Vec<String> = templates
            .iter()
            .map(|path| {
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            })
            .collect();
        let choice = ctx.select("Choose the uVision template", &names)?;
        let template = &templates[choice];

        let name = ctx.input_name("Name of the firmware project", &names[choice])?;
        let destination = ctx.working_dir().join(&name);
        if destination.exists() {
            return Err(ActionError::new(format!(
                "{} already exists in this directory",
                name
            )));
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

        println!(
            "{} {}",
            "Firmware project created at".green().bold(),
            destination.display()
        );
        Ok(())
    }
}
