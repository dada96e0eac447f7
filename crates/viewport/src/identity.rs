use crate::config::Config;
use crate::error::{ConfigError, Error, Result, describe_scope};
use crate::web_api::{ApiResponse, ThemeApi, TransportError};
use reqwest::StatusCode;
use serde::Deserialize;
use tokio::sync::OnceCell;

/// A theme as known to the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeIdentity {
    pub id: String,
    pub name: String,
    pub scope: String,
}

#[derive(Debug, Deserialize)]
struct ThemeRecord {
    id: serde_json::Value,
}

/// Resolves theme names to ids and caches the first id it looks up.
///
/// Every call here waits for the remote before returning: later steps rely
/// on a concrete id and must not start without one.
#[derive(Debug, Default)]
pub struct ThemeResolver {
    cached: OnceCell<ThemeIdentity>,
}

impl ThemeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(&self) -> Option<&ThemeIdentity> {
        self.cached.get()
    }

    /// An explicit `theme_id` is returned as is and never checked remotely.
    /// Otherwise the theme is looked up by name once per resolver; asking
    /// for a different name or scope afterwards is an error.
    pub async fn resolve_id<A: ThemeApi>(&self, api: &A, config: &Config) -> Result<String> {
        if let Some(id) = &config.theme_id {
            return Ok(id.clone());
        }

        let identity = self
            .cached
            .get_or_try_init(|| lookup_identity(api, config))
            .await?;

        let requested = config.theme_name.as_deref().unwrap_or_default();
        if identity.name != requested || identity.scope != config.scope {
            return Err(Error::IdentityMismatch {
                cached: identity.name.clone(),
                cached_scope: describe_scope(&identity.scope),
                requested: requested.to_string(),
                requested_scope: describe_scope(&config.scope),
            });
        }

        Ok(identity.id.clone())
    }

    pub async fn exists<A: ThemeApi>(&self, api: &A, config: &Config) -> Result<bool> {
        match lookup(api, config).await? {
            (StatusCode::OK, _) => Ok(true),
            (StatusCode::NOT_FOUND, _) => Ok(false),
            (status, _) => Err(Error::UnexpectedStatus {
                endpoint: config.endpoint().to_string(),
                status,
            }),
        }
    }

    /// Creates the theme under `config.scope`. Callers check [`Self::exists`]
    /// first; creating twice is left to the remote to reject.
    pub async fn create<A: ThemeApi>(&self, api: &A, config: &Config) -> Result<()> {
        let remote = config.remote()?;
        let name = theme_name(config)?;

        let response = api
            .create_theme(remote, name, &config.scope)
            .await
            .map_err(|e| transport(config, e))?;

        match response.status {
            StatusCode::OK => {
                log::info!(
                    "{} Theme '{name}' created in scope {}",
                    config.user_annotation(),
                    describe_scope(&config.scope)
                );
                Ok(())
            }
            status => Err(auth_error(status, config).unwrap_or_else(|| Error::Creation {
                theme: name.to_string(),
                endpoint: config.endpoint().to_string(),
                status,
            })),
        }
    }
}

async fn lookup_identity<A: ThemeApi>(api: &A, config: &Config) -> Result<ThemeIdentity> {
    match lookup(api, config).await? {
        (StatusCode::OK, Some(identity)) => {
            log::info!(
                "{} Theme '{}' resolved to id {}",
                config.user_annotation(),
                identity.name,
                identity.id
            );
            Ok(identity)
        }
        _ => Err(Error::NotFound {
            theme: config.theme_label().to_string(),
            scope: describe_scope(&config.scope),
            endpoint: config.endpoint().to_string(),
        }),
    }
}

/// Looks the theme up by name and scope. 401 and 403 are raised right away;
/// every other status is handed back for the caller to judge.
async fn lookup<A: ThemeApi>(
    api: &A,
    config: &Config,
) -> Result<(StatusCode, Option<ThemeIdentity>)> {
    let remote = config.remote()?;
    let name = theme_name(config)?;

    let response = api
        .find_theme(remote, name, &config.scope)
        .await
        .map_err(|e| transport(config, e))?;

    if let Some(err) = auth_error(response.status, config) {
        return Err(err);
    }

    if response.status != StatusCode::OK {
        return Ok((response.status, None));
    }

    let identity = parse_identity(&response, name, config)?;
    Ok((response.status, Some(identity)))
}

fn parse_identity(response: &ApiResponse, name: &str, config: &Config) -> Result<ThemeIdentity> {
    let invalid = |message: String| Error::InvalidResponse {
        endpoint: config.endpoint().to_string(),
        message,
    };

    let record: ThemeRecord =
        serde_json::from_str(&response.body).map_err(|e| invalid(e.to_string()))?;
    let id = match record.id {
        serde_json::Value::String(id) => id,
        serde_json::Value::Number(id) => id.to_string(),
        other => return Err(invalid(format!("unexpected theme id {other}"))),
    };

    Ok(ThemeIdentity {
        id,
        name: name.to_string(),
        scope: config.scope.clone(),
    })
}

fn theme_name(config: &Config) -> Result<&str> {
    config
        .theme_name
        .as_deref()
        .ok_or(Error::Config(ConfigError::MissingField("themeName")))
}

fn auth_error(status: StatusCode, config: &Config) -> Option<Error> {
    let identity = config.user_annotation();
    let scope = describe_scope(&config.scope);
    let endpoint = config.endpoint().to_string();

    match status {
        StatusCode::UNAUTHORIZED => Some(Error::Auth {
            identity,
            scope,
            endpoint,
        }),
        StatusCode::FORBIDDEN => Some(Error::Permission {
            identity,
            scope,
            endpoint,
        }),
        _ => None,
    }
}

fn transport(config: &Config, e: TransportError) -> Error {
    Error::Transport {
        endpoint: config.endpoint().to_string(),
        message: e.message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NoProfiles, Options, resolve};
    use crate::testing::MockApi;

    fn config(options: Options) -> Config {
        let base = Options::new()
            .base_url("https://wiki.example")
            .username("alice")
            .password("pw");
        resolve(&Options::new(), &NoProfiles, &base, &options).unwrap()
    }

    #[tokio::test]
    async fn explicit_id_skips_lookup() {
        let api = MockApi::new();
        let resolver = ThemeResolver::new();
        let id = resolver
            .resolve_id(&api, &config(Options::new().theme_id("77")))
            .await
            .unwrap();

        assert_eq!(id, "77");
        assert_eq!(api.lookups(), 0);
        assert!(resolver.cached().is_none());
    }

    #[tokio::test]
    async fn lookup_happens_once() {
        let api = MockApi::new().find(StatusCode::OK, r#"{"id": 4242, "name": "t"}"#);
        let resolver = ThemeResolver::new();
        let config = config(Options::new().theme_name("t").scope("DOCS"));

        assert_eq!(resolver.resolve_id(&api, &config).await.unwrap(), "4242");
        assert_eq!(resolver.resolve_id(&api, &config).await.unwrap(), "4242");
        assert_eq!(api.lookups(), 1);
        assert_eq!(
            resolver.cached(),
            Some(&ThemeIdentity {
                id: "4242".into(),
                name: "t".into(),
                scope: "DOCS".into(),
            })
        );
    }

    #[tokio::test]
    async fn unauthorized_lookup_is_auth_error() {
        let api = MockApi::new().find(StatusCode::UNAUTHORIZED, "");
        let err = ThemeResolver::new()
            .resolve_id(&api, &config(Options::new().theme_name("t")))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Auth { .. }), "{err:?}");
        let message = err.to_string();
        assert!(message.contains("[alice]"));
        assert!(message.contains("global"));
    }

    #[tokio::test]
    async fn forbidden_lookup_is_permission_error() {
        let api = MockApi::new().find(StatusCode::FORBIDDEN, "");
        let err = ThemeResolver::new()
            .resolve_id(&api, &config(Options::new().theme_name("t").scope("DOCS")))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Permission { .. }), "{err:?}");
        assert!(err.to_string().contains("'DOCS'"));
    }

    #[tokio::test]
    async fn other_statuses_are_not_found() {
        for status in [StatusCode::NOT_FOUND, StatusCode::INTERNAL_SERVER_ERROR] {
            let api = MockApi::new().find(status, "");
            let err = ThemeResolver::new()
                .resolve_id(&api, &config(Options::new().theme_name("t")))
                .await
                .unwrap_err();

            assert!(matches!(err, Error::NotFound { .. }), "{err:?}");
            assert!(err.to_string().contains("https://wiki.example"));
        }
    }

    #[tokio::test]
    async fn cached_identity_rejects_other_theme() {
        let api = MockApi::new().find(StatusCode::OK, r#"{"id": 5}"#);
        let resolver = ThemeResolver::new();

        let first = config(Options::new().theme_name("t"));
        assert_eq!(resolver.resolve_id(&api, &first).await.unwrap(), "5");

        for other in [
            config(Options::new().theme_name("other")),
            config(Options::new().theme_name("t").scope("DOCS")),
        ] {
            let err = resolver.resolve_id(&api, &other).await.unwrap_err();
            assert!(matches!(err, Error::IdentityMismatch { .. }), "{err:?}");
        }
        assert_eq!(api.lookups(), 1);
    }

    #[tokio::test]
    async fn failed_lookup_is_not_cached() {
        let api = MockApi::new().find(StatusCode::NOT_FOUND, "");
        let resolver = ThemeResolver::new();
        let config = config(Options::new().theme_name("t"));

        assert!(resolver.resolve_id(&api, &config).await.is_err());
        assert!(resolver.resolve_id(&api, &config).await.is_err());
        assert_eq!(api.lookups(), 2);
    }

    #[tokio::test]
    async fn exists_maps_statuses() {
        let resolver = ThemeResolver::new();
        let config = config(Options::new().theme_name("t"));

        let found = MockApi::new().find(StatusCode::OK, r#"{"id": "abc"}"#);
        assert!(resolver.exists(&found, &config).await.unwrap());

        let missing = MockApi::new().find(StatusCode::NOT_FOUND, "");
        assert!(!resolver.exists(&missing, &config).await.unwrap());

        let denied = MockApi::new().find(StatusCode::UNAUTHORIZED, "");
        assert!(matches!(
            resolver.exists(&denied, &config).await,
            Err(Error::Auth { .. })
        ));
    }

    #[tokio::test]
    async fn create_maps_statuses() {
        let resolver = ThemeResolver::new();
        let config = config(Options::new().theme_name("t").scope("DOCS"));

        let ok = MockApi::new().create(StatusCode::OK, "{}");
        resolver.create(&ok, &config).await.unwrap();
        assert_eq!(ok.created(), vec![("t".to_string(), "DOCS".to_string())]);

        let forbidden = MockApi::new().create(StatusCode::FORBIDDEN, "");
        assert!(matches!(
            resolver.create(&forbidden, &config).await,
            Err(Error::Permission { .. })
        ));

        let conflict = MockApi::new().create(StatusCode::CONFLICT, "");
        assert!(matches!(
            resolver.create(&conflict, &config).await,
            Err(Error::Creation { .. })
        ));
    }

    #[tokio::test]
    async fn transport_failure_is_fatal() {
        let api = MockApi::new().find_fails("connection refused");
        let err = ThemeResolver::new()
            .resolve_id(&api, &config(Options::new().theme_name("t")))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Transport { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn missing_base_url_fails_before_io() {
        let config = resolve(
            &Options::new(),
            &NoProfiles,
            &Options::new().theme_name("t"),
            &Options::new(),
        )
        .unwrap();
        let api = MockApi::new();
        let err = ThemeResolver::new().resolve_id(&api, &config).await.unwrap_err();

        assert!(matches!(err, Error::Config(ConfigError::MissingField(_))));
        assert_eq!(api.lookups(), 0);
    }
}
