//! Cascading configuration.
//!
//! Options come in layers: built-in defaults, `VPRT_*` environment values, a
//! named profile from the profile store, and explicit options given to the
//! client or to a single call. [`resolve`] folds them into an immutable
//! [`Config`] without touching any of its inputs.

use crate::error::{ConfigError, RemoteError};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_SOURCE_BASE: &str = "./";
pub const DEFAULT_TARGET_PATH: &str = "./";

pub const ENV_THEME_NAME: &str = "VPRT_THEMENAME";
pub const ENV_THEME_ID: &str = "VPRT_THEMEID";
pub const ENV_PROFILE: &str = "VPRT_ENV";
pub const ENV_SCOPE: &str = "VPRT_SCOPE";
pub const ENV_BASE_URL: &str = "VPRT_CONFLUENCEBASEURL";
pub const ENV_USERNAME: &str = "VPRT_USERNAME";
pub const ENV_PASSWORD: &str = "VPRT_PASSWORD";
pub const ENV_SOURCE_BASE: &str = "VPRT_SOURCEBASE";
pub const ENV_TARGET_PATH: &str = "VPRT_TARGETPATH";

pub type SuccessHook = Arc<dyn Fn(&serde_json::Value) + Send + Sync>;
pub type ErrorHook = Arc<dyn Fn(&RemoteError) + Send + Sync>;

/// Callbacks invoked per uploaded resource and per failed upload.
#[derive(Clone, Default)]
pub struct Hooks {
    pub success: Option<SuccessHook>,
    pub error: Option<ErrorHook>,
}

impl Hooks {
    fn layered(&self, over: &Hooks) -> Hooks {
        Hooks {
            success: over.success.clone().or_else(|| self.success.clone()),
            error: over.error.clone().or_else(|| self.error.clone()),
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("success", &self.success.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}

/// Connection and credentials of the remote Confluence instance.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Target {
    #[serde(alias = "confluence_base_url", alias = "confluenceBaseUrl")]
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl Target {
    /// Key-by-key merge: fields set on `over` win, everything else is kept.
    pub fn layered(&self, over: &Target) -> Target {
        Target {
            base_url: over.base_url.clone().or_else(|| self.base_url.clone()),
            username: over.username.clone().or_else(|| self.username.clone()),
            password: over.password.clone().or_else(|| self.password.clone()),
            scope: over.scope.clone().or_else(|| self.scope.clone()),
        }
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("scope", &self.scope)
            .finish()
    }
}

/// One unresolved configuration layer. Unset fields fall through to lower
/// layers.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub theme_name: Option<String>,
    pub theme_id: Option<String>,
    pub scope: Option<String>,
    pub profile: Option<String>,
    pub target: Target,
    pub source_base: Option<String>,
    pub target_path: Option<String>,
    pub skip_unchanged: Option<bool>,
    pub hooks: Hooks,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the `VPRT_*` variables of the current process.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| non_empty(var(key));

        Options {
            theme_name: get(ENV_THEME_NAME),
            theme_id: get(ENV_THEME_ID),
            scope: var(ENV_SCOPE),
            profile: get(ENV_PROFILE),
            target: Target {
                base_url: get(ENV_BASE_URL),
                username: get(ENV_USERNAME),
                password: var(ENV_PASSWORD),
                scope: None,
            },
            source_base: get(ENV_SOURCE_BASE),
            target_path: get(ENV_TARGET_PATH),
            skip_unchanged: None,
            hooks: Hooks::default(),
        }
    }

    pub fn theme_name(mut self, name: impl Into<String>) -> Self {
        self.theme_name = Some(name.into());
        self
    }

    pub fn theme_id(mut self, id: impl Into<String>) -> Self {
        self.theme_id = Some(id.into());
        self
    }

    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.target.base_url = Some(url.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.target.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.target.password = Some(password.into());
        self
    }

    pub fn source_base(mut self, path: impl Into<String>) -> Self {
        self.source_base = Some(path.into());
        self
    }

    pub fn target_path(mut self, path: impl Into<String>) -> Self {
        self.target_path = Some(path.into());
        self
    }

    pub fn skip_unchanged(mut self, skip: bool) -> Self {
        self.skip_unchanged = Some(skip);
        self
    }

    pub fn on_success(mut self, hook: impl Fn(&serde_json::Value) + Send + Sync + 'static) -> Self {
        self.hooks.success = Some(Arc::new(hook));
        self
    }

    pub fn on_error(mut self, hook: impl Fn(&RemoteError) + Send + Sync + 'static) -> Self {
        self.hooks.error = Some(Arc::new(hook));
        self
    }

    /// Returns a new layer where every field set on `over` wins. `target` and
    /// `hooks` are merged key by key.
    pub fn layered(&self, over: &Options) -> Options {
        Options {
            theme_name: over.theme_name.clone().or_else(|| self.theme_name.clone()),
            theme_id: over.theme_id.clone().or_else(|| self.theme_id.clone()),
            scope: over.scope.clone().or_else(|| self.scope.clone()),
            profile: over.profile.clone().or_else(|| self.profile.clone()),
            target: self.target.layered(&over.target),
            source_base: over.source_base.clone().or_else(|| self.source_base.clone()),
            target_path: over.target_path.clone().or_else(|| self.target_path.clone()),
            skip_unchanged: over.skip_unchanged.or(self.skip_unchanged),
            hooks: self.hooks.layered(&over.hooks),
        }
    }
}

/// Source of named remote-target profiles.
pub trait ProfileStore: Send + Sync {
    fn profile(&self, name: &str) -> Option<Target>;
}

/// A store without any profiles.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProfiles;

impl ProfileStore for NoProfiles {
    fn profile(&self, _name: &str) -> Option<Target> {
        None
    }
}

impl ProfileStore for HashMap<String, Target> {
    fn profile(&self, name: &str) -> Option<Target> {
        self.get(name).cloned()
    }
}

/// Fully resolved configuration for one operation.
#[derive(Debug, Clone)]
pub struct Config {
    pub theme_name: Option<String>,
    pub theme_id: Option<String>,
    pub scope: String,
    pub profile: Option<String>,
    pub target: Target,
    pub source_base: String,
    pub target_path: String,
    pub skip_unchanged: bool,
    pub hooks: Hooks,
}

/// Borrowed connection details, guaranteed to be present.
#[derive(Debug, Clone, Copy)]
pub struct Remote<'a> {
    pub base_url: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

impl Config {
    pub fn remote(&self) -> Result<Remote<'_>, ConfigError> {
        Ok(Remote {
            base_url: self
                .target
                .base_url
                .as_deref()
                .ok_or(ConfigError::MissingField("target.base_url"))?,
            username: self
                .target
                .username
                .as_deref()
                .ok_or(ConfigError::MissingField("target.username"))?,
            password: self.target.password.as_deref().unwrap_or_default(),
        })
    }

    /// `[user@profile]` or `[user]`, used to tag log lines and errors.
    pub fn user_annotation(&self) -> String {
        let user = self.target.username.as_deref().unwrap_or("anonymous");
        match &self.profile {
            Some(profile) => format!("[{user}@{profile}]"),
            None => format!("[{user}]"),
        }
    }

    /// The name of the theme, or its id when only the id is known.
    pub fn theme_label(&self) -> &str {
        self.theme_name
            .as_deref()
            .or(self.theme_id.as_deref())
            .unwrap_or_default()
    }

    pub fn endpoint(&self) -> &str {
        self.target.base_url.as_deref().unwrap_or("<no base url>")
    }
}

/// Folds the configuration layers into one [`Config`].
///
/// Precedence, lowest first: defaults, `env`, the named profile, then `base`
/// and `overrides` (the explicit layers). Neither input is modified.
pub fn resolve(
    env: &Options,
    profiles: &dyn ProfileStore,
    base: &Options,
    overrides: &Options,
) -> Result<Config, ConfigError> {
    let explicit = base.layered(overrides);
    let merged = env.layered(&explicit);

    let profile = non_empty(merged.profile.clone());
    let mut target = env.target.clone();
    if let Some(name) = &profile {
        let stored = profiles
            .profile(name)
            .ok_or_else(|| ConfigError::UnknownProfile(name.clone()))?;
        target = target.layered(&stored);
    }
    let mut target = target.layered(&explicit.target);
    target.base_url = non_empty(target.base_url).map(|url| url.trim_end_matches('/').to_string());

    let theme_id = non_empty(merged.theme_id);
    let theme_name = non_empty(merged.theme_name);
    if theme_id.is_none() && theme_name.is_none() {
        return Err(ConfigError::MissingThemeIdentity);
    }

    let scope = merged
        .scope
        .or_else(|| target.scope.clone())
        .unwrap_or_default();

    Ok(Config {
        theme_name,
        theme_id,
        scope,
        profile,
        target,
        source_base: non_empty(merged.source_base).unwrap_or_else(|| DEFAULT_SOURCE_BASE.into()),
        target_path: non_empty(merged.target_path).unwrap_or_else(|| DEFAULT_TARGET_PATH.into()),
        skip_unchanged: merged.skip_unchanged.unwrap_or(false),
        hooks: merged.hooks,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
