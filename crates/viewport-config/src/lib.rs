use anyhow::{Context, Result};
use fs_err::tokio as fs;
use globset::Glob;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use viewport::{Options, ProfileStore, Target};

pub const FILE_NAME: &str = "viewport.toml";
pub const RC_FILE_NAME: &str = ".viewportrc";
pub const ENV_RC_PATH: &str = "VIEWPORTRC";

/// Named remote targets from `~/.viewportrc`, one TOML table per profile:
///
/// ```toml
/// [DEV]
/// confluence_base_url = "http://localhost:1990/confluence"
/// username = "admin"
/// password = "admin"
/// ```
///
/// Files in the older INI form (`confluenceBaseUrl=http://...`, unquoted
/// values) are read as well.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct ViewportRc {
    profiles: HashMap<String, Target>,
}

impl ViewportRc {
    /// Reads the file named by `VIEWPORTRC`, or `~/.viewportrc`. A missing
    /// file yields an empty store.
    pub async fn read() -> Result<Self> {
        match default_rc_path() {
            Some(path) => Self::read_from(&path).await,
            None => Ok(Self::default()),
        }
    }

    pub async fn read_from(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e).context("Failed to read profile store"),
        };

        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        match toml::from_str(content) {
            Ok(rc) => Ok(rc),
            Err(toml_err) => match parse_ini(content) {
                Some(table) => Ok(toml::Value::Table(table).try_into()?),
                None => Err(toml_err.into()),
            },
        }
    }
}

/// Sections of `key=value` lines, as written by older tooling. `None` when a
/// line fits neither form.
fn parse_ini(content: &str) -> Option<toml::Table> {
    let mut profiles = toml::Table::new();
    let mut current: Option<String> = None;

    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with([';', '#']) {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = name.trim().to_string();
            profiles
                .entry(name.clone())
                .or_insert(toml::Value::Table(toml::Table::new()));
            current = Some(name);
            continue;
        }

        let (key, value) = line.split_once('=')?;
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);

        let section = profiles.get_mut(current.as_deref()?)?.as_table_mut()?;
        section.insert(key.trim().to_string(), toml::Value::String(value.to_string()));
    }

    Some(profiles)
}

impl ProfileStore for ViewportRc {
    fn profile(&self, name: &str) -> Option<Target> {
        self.profiles.get(name).cloned()
    }
}

fn default_rc_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(ENV_RC_PATH) {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(RC_FILE_NAME))
}

/// Project manifest (`viewport.toml`) describing the theme and the upload
/// steps of a deploy.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    pub theme: ThemeSection,

    #[serde(default, rename = "upload")]
    pub uploads: Vec<UploadStep>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThemeSection {
    pub name: Option<String>,
    pub id: Option<String>,
    pub scope: Option<String>,
    /// Profile from the profile store.
    pub env: Option<String>,
    #[serde(default)]
    pub source_base: Option<String>,
}

/// One batch of files uploaded together.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadStep {
    pub name: Option<String>,
    /// Files to upload, relative to the project directory.
    pub include: Glob,
    pub source_base: Option<String>,
    pub target_path: Option<String>,
}

impl ProjectConfig {
    /// Read viewport.toml from the current directory
    pub async fn read() -> Result<Self> {
        Self::read_from(Path::new(".")).await
    }

    pub async fn read_from(dir: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(dir.join(FILE_NAME))
            .await
            .context("Failed to read viewport.toml")?;

        let config: ProjectConfig =
            toml::from_str(&config_str).context("Failed to parse viewport.toml")?;

        Ok(config)
    }

    /// Base client options for the theme.
    pub fn theme_options(&self) -> Options {
        Options {
            theme_name: self.theme.name.clone(),
            theme_id: self.theme.id.clone(),
            scope: self.theme.scope.clone(),
            profile: self.theme.env.clone(),
            source_base: self.theme.source_base.clone(),
            ..Options::default()
        }
    }
}

impl UploadStep {
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.include.glob())
    }

    /// Per-call overrides for this step.
    pub fn options(&self) -> Options {
        Options {
            source_base: self.source_base.clone(),
            target_path: self.target_path.clone(),
            ..Options::default()
        }
    }
}
