pub mod create;
pub mod deploy;
pub mod reset;
pub mod upload;

use clap::Args;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;
use tokio::runtime::Runtime;
use viewport::{Options, RemoveOutcome, ViewportTheme};
use viewport_config::ViewportRc;

/// Theme and connection settings. Anything left out falls back to the
/// `VPRT_*` environment and the selected profile.
#[derive(Args, Debug, Clone, Default)]
pub struct ThemeArgs {
    /// Name of the theme
    #[arg(long)]
    pub theme_name: Option<String>,

    /// Id of the theme (skips the lookup by name)
    #[arg(long)]
    pub theme_id: Option<String>,

    /// Space key the theme belongs to; empty for a global theme
    #[arg(long)]
    pub scope: Option<String>,

    /// Profile from ~/.viewportrc
    #[arg(long = "env", value_name = "PROFILE")]
    pub profile: Option<String>,

    /// Confluence base URL
    #[arg(long)]
    pub base_url: Option<String>,

    #[arg(long)]
    pub username: Option<String>,

    #[arg(long)]
    pub password: Option<String>,

    /// Exit with an error when an upload or reset fails
    #[arg(long)]
    pub fail_on_error: bool,
}

impl ThemeArgs {
    pub fn options(&self) -> Options {
        let mut options = Options::new();
        options.theme_name = self.theme_name.clone();
        options.theme_id = self.theme_id.clone();
        options.scope = self.scope.clone();
        options.profile = self.profile.clone();
        options.target.base_url = self.base_url.clone();
        options.target.username = self.username.clone();
        options.target.password = self.password.clone();
        options
    }

    /// Whether a reported (non-fatal) failure should still pass.
    pub fn tolerate(&self, success: bool) -> bool {
        success || !self.fail_on_error
    }
}

pub async fn connect(base: Options) -> anyhow::Result<ViewportTheme> {
    let profiles = ViewportRc::read().await?;
    Ok(ViewportTheme::new(base, profiles)?)
}

/// Runs `future` on a fresh runtime, printing any error with the command tag.
pub fn block_on<F>(tag: &str, future: F) -> bool
where
    F: Future<Output = anyhow::Result<bool>>,
{
    let rt = match Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("[{tag}] ERROR: Failed to create tokio runtime: {e}");
            return false;
        }
    };

    match rt.block_on(future) {
        Ok(passed) => passed,
        Err(e) => {
            eprintln!("[{tag}] ERROR: {e:#}");
            false
        }
    }
}

pub fn spinner(progress: &MultiProgress, message: String) -> ProgressBar {
    let bar = progress.add(ProgressBar::new_spinner());
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

pub async fn reset(client: &ViewportTheme, progress: &MultiProgress) -> anyhow::Result<bool> {
    let bar = spinner(progress, "Removing theme resources …".to_string());
    let outcome = client.remove_all(&Options::new()).await;
    bar.finish_and_clear();

    Ok(matches!(outcome?, RemoveOutcome::Removed))
}
