use super::{ThemeArgs, block_on, connect, reset};
use clap::Parser;
use indicatif::MultiProgress;

#[derive(Parser, Debug)]
#[command(about = "Remove all resources from the theme")]
pub struct ResetArgs {
    #[command(flatten)]
    pub theme: ThemeArgs,
}

pub fn run(args: ResetArgs, progress: MultiProgress) -> bool {
    block_on("reset", run_async(args, progress))
}

async fn run_async(args: ResetArgs, progress: MultiProgress) -> anyhow::Result<bool> {
    let client = connect(args.theme.options()).await?;
    let removed = reset(&client, &progress).await?;
    Ok(args.theme.tolerate(removed))
}
