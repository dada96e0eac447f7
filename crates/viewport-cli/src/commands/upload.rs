use super::{ThemeArgs, block_on, connect, reset, spinner};
use crate::walk;
use clap::Parser;
use indicatif::MultiProgress;
use viewport::{Options, UploadOutcome};

#[derive(Parser, Debug)]
#[command(about = "Upload files matching the given globs in one batch")]
pub struct UploadArgs {
    /// Globs selecting the files to upload (e.g. "src/assets/img/**/*")
    #[arg(value_name = "GLOB", required = true)]
    pub patterns: Vec<String>,

    /// Local root the remote locations are computed from, or a single file
    /// whose contents are uploaded for every match
    #[arg(long)]
    pub source_base: Option<String>,

    /// Remote root, or a single remote file receiving every match
    #[arg(long)]
    pub target_path: Option<String>,

    /// Remove all theme resources before uploading
    #[arg(long)]
    pub reset: bool,

    #[command(flatten)]
    pub theme: ThemeArgs,
}

pub fn run(args: UploadArgs, progress: MultiProgress) -> bool {
    block_on("upload", run_async(args, progress))
}

async fn run_async(args: UploadArgs, progress: MultiProgress) -> anyhow::Result<bool> {
    let client = connect(args.theme.options()).await?;

    let mut passed = true;
    if args.reset {
        passed &= args.theme.tolerate(reset(&client, &progress).await?);
    }

    let overrides = Options {
        source_base: args.source_base.clone(),
        target_path: args.target_path.clone(),
        ..Options::default()
    };
    let files = walk::collect_all(&args.patterns)?;
    let mut batch = client.upload(&overrides).await?;
    for file in files {
        batch.push(file);
    }

    let bar = spinner(&progress, format!("Uploading {} files …", batch.len()));
    let outcome = batch.finish().await;
    bar.finish_and_clear();

    passed &= args.theme.tolerate(matches!(outcome, UploadOutcome::Uploaded(_)));
    Ok(passed)
}
