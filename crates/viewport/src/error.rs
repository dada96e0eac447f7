use reqwest::StatusCode;
use std::path::PathBuf;

/// Problems found while merging and validating configuration. Always raised
/// before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown profile '{0}' (not defined in the profile store)")]
    UnknownProfile(String),

    #[error("theme identity missing: set themeName or themeId")]
    MissingThemeIdentity,

    #[error("missing required field '{0}'")]
    MissingField(&'static str),
}

/// Fatal errors of identity resolution and configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{identity} authentication failed in scope {scope} at '{endpoint}'")]
    Auth {
        identity: String,
        scope: String,
        endpoint: String,
    },

    #[error("{identity} is not permitted to access themes in scope {scope} at '{endpoint}'")]
    Permission {
        identity: String,
        scope: String,
        endpoint: String,
    },

    #[error(
        "theme '{theme}' not found in scope {scope} on '{endpoint}'! Create a new theme named exactly like this to fix."
    )]
    NotFound {
        theme: String,
        scope: String,
        endpoint: String,
    },

    #[error(
        "this client is bound to theme '{cached}' in scope {cached_scope}; use a new client for '{requested}' in scope {requested_scope}"
    )]
    IdentityMismatch {
        cached: String,
        cached_scope: String,
        requested: String,
        requested_scope: String,
    },

    #[error("could not create theme '{theme}' on '{endpoint}': {status}")]
    Creation {
        theme: String,
        endpoint: String,
        status: StatusCode,
    },

    #[error("unexpected response {status} from '{endpoint}'")]
    UnexpectedStatus { endpoint: String, status: StatusCode },

    #[error("invalid response from '{endpoint}': {message}")]
    InvalidResponse { endpoint: String, message: String },

    #[error("request to '{endpoint}' failed: {message}")]
    Transport { endpoint: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// A failed upload or delete. Reported through hooks, events and the log,
/// and never aborts the surrounding pipeline.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RemoteError {
    #[error("{status}")]
    Status { status: StatusCode, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to read {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Renders a scope for messages; the empty scope is the global one.
pub(crate) fn describe_scope(scope: &str) -> String {
    if scope.is_empty() {
        "global".to_string()
    } else {
        format!("'{scope}'")
    }
}
