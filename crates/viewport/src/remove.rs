use crate::config::Config;
use crate::error::RemoteError;
use crate::events::{Event, Notifier};
use crate::web_api::ThemeApi;
use reqwest::StatusCode;

#[derive(Debug)]
pub enum RemoveOutcome {
    Removed,
    Failed(RemoteError),
}

impl RemoveOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RemoveOutcome::Removed)
    }
}

/// Deletes every resource of the theme in a single call. Emits `remove`
/// first and then exactly one of `removed` or `error`.
pub(crate) async fn remove_all<A: ThemeApi>(
    api: &A,
    events: &Notifier,
    config: &Config,
    theme_id: &str,
) -> RemoveOutcome {
    events.emit(Event::Remove);

    let result = match config.remote() {
        Ok(remote) => api
            .delete_resources(remote, theme_id)
            .await
            .map_err(|e| RemoteError::Transport(e.to_string())),
        Err(e) => Err(RemoteError::Transport(e.to_string())),
    };

    let err = match result {
        Ok(response) if response.status == StatusCode::NO_CONTENT => {
            log::info!("{} Resources successfully removed", config.user_annotation());
            events.emit(Event::Removed);
            return RemoveOutcome::Removed;
        }
        Ok(response) => RemoteError::Status {
            status: response.status,
            body: response.body,
        },
        Err(e) => e,
    };

    log::error!(
        "{} Error while removing resources: {err}",
        config.user_annotation()
    );
    events.emit(Event::Error {
        message: err.to_string(),
    });
    RemoveOutcome::Failed(err)
}
