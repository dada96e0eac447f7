use crate::batch::UploadBatch;
use crate::config::{Config, NoProfiles, Options, ProfileStore, resolve};
use crate::error::{ConfigError, Result};
use crate::events::{Event, EventKind, Notifier};
use crate::identity::{ThemeIdentity, ThemeResolver};
use crate::remove::{self, RemoveOutcome};
use crate::web_api::{HttpApi, ThemeApi};
use std::sync::Arc;

/// A handle on one remote theme.
///
/// The options given at construction are the base layer; every call may pass
/// overrides that apply to that call only. The theme id is looked up on first
/// use and kept for the lifetime of the client.
pub struct ViewportTheme<A: ThemeApi = HttpApi> {
    env: Options,
    base: Options,
    profiles: Arc<dyn ProfileStore>,
    api: A,
    resolver: ThemeResolver,
    events: Notifier,
}

impl ViewportTheme<HttpApi> {
    /// Builds a client over HTTP, reading `VPRT_*` variables from the process
    /// environment.
    pub fn new(options: Options, profiles: impl ProfileStore + 'static) -> Result<Self> {
        Self::with_api(HttpApi::new(), Options::from_env(), options, profiles)
    }
}

impl<A: ThemeApi> ViewportTheme<A> {
    /// Builds a client from explicit layers. The base configuration is
    /// validated right away.
    pub fn with_api(
        api: A,
        env: Options,
        options: Options,
        profiles: impl ProfileStore + 'static,
    ) -> Result<Self> {
        let client = Self {
            env,
            base: options,
            profiles: Arc::new(profiles),
            api,
            resolver: ThemeResolver::new(),
            events: Notifier::new(),
        };

        let config = client.config(&Options::new())?;
        log::info!(
            "{} Changing theme '{}' at {}",
            config.user_annotation(),
            config.theme_label(),
            config.endpoint()
        );
        Ok(client)
    }

    pub fn without_profiles(api: A, env: Options, options: Options) -> Result<Self> {
        Self::with_api(api, env, options, NoProfiles)
    }

    /// Resolves the configuration for one call. The base layer is not
    /// modified.
    pub fn config(&self, overrides: &Options) -> std::result::Result<Config, ConfigError> {
        resolve(&self.env, self.profiles.as_ref(), &self.base, overrides)
    }

    pub fn events(&self) -> &Notifier {
        &self.events
    }

    pub fn on<F>(&self, kind: EventKind, handler: F)
    where
        F: Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.events.on(kind, handler);
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// The cached identity, once a name lookup has succeeded.
    pub fn identity(&self) -> Option<&ThemeIdentity> {
        self.resolver.cached()
    }

    pub async fn theme_id(&self) -> Result<String> {
        let config = self.config(&Options::new())?;
        self.resolver.resolve_id(&self.api, &config).await
    }

    pub async fn exists(&self) -> Result<bool> {
        let config = self.config(&Options::new())?;
        self.resolver.exists(&self.api, &config).await
    }

    pub async fn create(&self) -> Result<()> {
        let config = self.config(&Options::new())?;
        self.resolver.create(&self.api, &config).await
    }

    /// Creates the theme unless it already exists. Returns whether it was
    /// created.
    pub async fn ensure_exists(&self) -> Result<bool> {
        if self.exists().await? {
            log::info!("Theme '{}' already exists", self.config(&Options::new())?.theme_label());
            return Ok(false);
        }
        self.create().await?;
        Ok(true)
    }

    /// Opens an upload batch. Configuration and theme id are settled before
    /// anything is queued, so any error here happens before file or upload
    /// I/O.
    pub async fn upload(&self, overrides: &Options) -> Result<UploadBatch<'_, A>> {
        let config = self.config(overrides)?;
        config.remote()?;
        let theme_id = self.resolver.resolve_id(&self.api, &config).await?;

        Ok(UploadBatch::open(&self.api, &self.events, config, theme_id))
    }

    /// Deletes every resource of the theme. Configuration and identity errors
    /// are returned; a failed delete is reported in the outcome.
    pub async fn remove_all(&self, overrides: &Options) -> Result<RemoveOutcome> {
        let config = self.config(overrides)?;
        config.remote()?;
        let theme_id = self.resolver.resolve_id(&self.api, &config).await?;

        Ok(remove::remove_all(&self.api, &self.events, &config, &theme_id).await)
    }
}
