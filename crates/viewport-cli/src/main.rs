mod commands;
mod walk;

use clap::{Parser, Subcommand, builder::styling};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;

#[derive(Parser)]
#[command(name = "viewport")]
#[command(about = "Push theme assets to Scroll Viewport")]
#[command(version = env!("VIEWPORT_VERSION"))]
#[command(long_version = env!("VIEWPORT_VERSION"))]
#[command(
    styles = styling::Styles::styled()
        .header(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .usage(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .literal(styling::AnsiColor::Cyan.on_default() | styling::Effects::BOLD)
        .placeholder(styling::AnsiColor::Cyan.on_default())
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload files matching the given globs in one batch
    Upload(commands::upload::UploadArgs),
    /// Reset the theme and run every upload step of viewport.toml
    Deploy(commands::deploy::DeployArgs),
    /// Remove all resources from the theme
    Reset(commands::reset::ResetArgs),
    /// Create the theme unless it already exists
    Create(commands::create::CreateArgs),
}

fn main() {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();

    let progress = MultiProgress::new();
    let logger = env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .format_timestamp(None)
        .build();
    let level = logger.filter();
    if LogWrapper::new(progress.clone(), logger).try_init().is_ok() {
        log::set_max_level(level);
    }

    let result = match cli.command {
        Commands::Upload(args) => commands::upload::run(args, progress),
        Commands::Deploy(args) => commands::deploy::run(args, progress),
        Commands::Reset(args) => commands::reset::run(args, progress),
        Commands::Create(args) => commands::create::run(args),
    };

    std::process::exit(if result { 0 } else { 1 });
}
