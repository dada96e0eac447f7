use super::{ThemeArgs, block_on, connect};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Create the theme unless it already exists")]
pub struct CreateArgs {
    #[command(flatten)]
    pub theme: ThemeArgs,
}

pub fn run(args: CreateArgs) -> bool {
    block_on("create", run_async(args))
}

async fn run_async(args: CreateArgs) -> anyhow::Result<bool> {
    let client = connect(args.theme.options()).await?;
    if client.ensure_exists().await? {
        println!("[create] Theme created");
    } else {
        println!("[create] Theme already exists");
    }
    Ok(true)
}
