//! Obsidian installer download

use async_trait::async_trait;
use colored::Colorize;
use tpl_actions::{Action, ActionDescriptor, ActionError, RegistryBuilder};
use tpl_fs::DriveMap;
use tpl_transfer::DownloadOptions;

use crate::context::RunContext;

const INSTALLER_VERSION: &str = "1.7.7";
const INSTALLER_URL: &str = "https://github.com/obsidianmd/obsidian-releases/releases/download/v1.7.7/Obsidian-1.7.7.exe";

pub fn register(builder: &mut RegistryBuilder<RunContext>, _drives: &DriveMap) {
    builder.register(
        ActionDescriptor::new(
            ["Office"],
            format!("Install Obsidian ({INSTALLER_VERSION})"),
            InstallObsidian,
        )
        .with_description("Download the Obsidian installer into the local cache directory."),
    );
}

struct InstallObsidian;

#[async_trait]
impl Action<RunContext> for InstallObsidian {
    async fn run(&self, ctx: &mut RunContext) -> Result<(), ActionError> {
        let cache = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("template-manager");
        let destination = cache.join(format!("Obsidian-{INSTALLER_VERSION}.exe"));

        if !ctx.confirm(
            &format!("Download the Obsidian {INSTALLER_VERSION} installer?"),
            true,
        )? {
            println!("Aborted, nothing was downloaded.");
            return Ok(());
        }

        let options = DownloadOptions {
            overwrite: true,
            ..Default::default()
        };
        let bytes = ctx
            .engine()
            .download(
                INSTALLER_URL,
                &destination,
                &options,
                Some(ctx.progress_sink()),
                ctx.cancel_token(),
            )
            .await
            .map_err(|e| ActionError::with_source("downloading the installer failed", e))?;

        println!(
            "{} {} ({})",
            "Downloaded".green().bold(),
            destination.display(),
            crate::summary::human_bytes(bytes)
        );
        println!("Run the installer from there to finish the installation.");
        Ok(())
    }
}
