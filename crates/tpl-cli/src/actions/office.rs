//! Office document templates

use async_trait::async_trait;
use colored::Colorize;
use tpl_actions::{Action, ActionDescriptor, ActionError, RegistryBuilder};
use tpl_fs::DriveMap;
use tpl_transfer::CopyOptions;

use crate::actions::{OFFICE_TEMPLATES, list_files, require_root};
use crate::context::RunContext;

pub fn register(builder: &mut RegistryBuilder<RunContext>, _drives: &DriveMap) {
    builder.register(
        ActionDescriptor::new(["Office"], "Create Document", CreateDocument)
            .with_description("Copy an Office template into the current directory."),
    );
}

struct CreateDocument;

#[async_trait]
impl Action<RunContext> for CreateDocument {
    async fn run(&self, ctx: &mut RunContext) -> Result<(), ActionError> {
        let root = require_root(ctx, OFFICE_TEMPLATES)?;
        let templates = list_files(&root)?;
        if templates.is_empty() {
            return Err(ActionError::new("no Office templates found on the share"));
        }

        let names: Vec<String> = templates
            .iter()
            .map(|path| {
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            })
            .collect();
        let choice = ctx.select("Choose a template", &names)?;
        let template = &templates[choice];

        let default = template
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = ctx.input_name("Document name", &default)?;

        let file_name = match template.extension() {
            Some(ext) => format!("{}.{}", name, ext.to_string_lossy()),
            None => name,
        };
        let destination = ctx.working_dir().join(file_name);

        let bytes = ctx
            .engine()
            .copy_file(
                template,
                &destination,
                &CopyOptions::default(),
                Some(ctx.progress_sink()),
                ctx.cancel_token(),
            )
            .await
            .map_err(|e| ActionError::with_source("copying the template failed", e))?;

        println!(
            "{} {} ({})",
            "Created".green().bold(),
            destination.display(),
            crate::summary::human_bytes(bytes)
        );
        Ok(())
    }
}
