use super::{ThemeArgs, block_on, connect, reset, spinner};
use crate::walk;
use anyhow::Context;
use clap::Parser;
use indicatif::MultiProgress;
use viewport::UploadOutcome;
use viewport_config::ProjectConfig;

#[derive(Parser, Debug)]
#[command(about = "Reset the theme and run every upload step of viewport.toml")]
pub struct DeployArgs {
    /// Keep existing theme resources
    #[arg(long)]
    pub no_reset: bool,

    #[command(flatten)]
    pub theme: ThemeArgs,
}

pub fn run(args: DeployArgs, progress: MultiProgress) -> bool {
    block_on("deploy", run_async(args, progress))
}

async fn run_async(args: DeployArgs, progress: MultiProgress) -> anyhow::Result<bool> {
    let project = ProjectConfig::read()
        .await
        .context("Make sure viewport.toml exists in the current directory")?;

    let base = project.theme_options().layered(&args.theme.options());
    let client = connect(base).await?;

    let mut passed = true;
    if !args.no_reset {
        passed &= args.theme.tolerate(reset(&client, &progress).await?);
    }

    for step in &project.uploads {
        let files = walk::collect(&step.include)?;
        let mut batch = client.upload(&step.options()).await?;
        for file in files {
            batch.push(file);
        }

        let bar = spinner(
            &progress,
            format!("[{}] Uploading {} files …", step.label(), batch.len()),
        );
        let outcome = batch.finish().await;
        bar.finish_and_clear();

        match &outcome {
            UploadOutcome::Uploaded(resources) => {
                println!("[deploy] {}: {} files", step.label(), resources.len())
            }
            UploadOutcome::Failed(e) => println!("[deploy] {}: failed ({e})", step.label()),
        }
        passed &= args.theme.tolerate(outcome.is_success());
    }

    println!("[deploy] Done");
    Ok(passed)
}
