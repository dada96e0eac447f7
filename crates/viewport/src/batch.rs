use crate::config::Config;
use crate::error::RemoteError;
use crate::events::{Event, Notifier};
use crate::mapper::{FileEntry, map_file};
use crate::source::SourceFile;
use crate::web_api::{ThemeApi, UploadPart};
use fs_err::tokio as fs;
use reqwest::StatusCode;

/// Result of flushing a batch. A failure has already been logged, handed to
/// the error hook and emitted as an `error` event when this is returned.
#[derive(Debug)]
pub enum UploadOutcome {
    /// Descriptors of the created resources, as returned by the remote.
    Uploaded(Vec<serde_json::Value>),
    Failed(RemoteError),
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Uploaded(_))
    }

    pub fn count(&self) -> usize {
        match self {
            UploadOutcome::Uploaded(resources) => resources.len(),
            UploadOutcome::Failed(_) => 0,
        }
    }
}

/// Collects the files of one upload run and sends them as a single request.
///
/// Files are passed back unchanged from [`UploadBatch::push`] so the caller
/// can keep streaming them to later stages. The queue belongs to this batch
/// alone; two batches of the same client never share entries.
pub struct UploadBatch<'a, A: ThemeApi> {
    api: &'a A,
    events: &'a Notifier,
    config: Config,
    theme_id: String,
    entries: Vec<FileEntry>,
}

impl<'a, A: ThemeApi> UploadBatch<'a, A> {
    pub(crate) fn open(api: &'a A, events: &'a Notifier, config: Config, theme_id: String) -> Self {
        events.emit(Event::Upload);
        Self {
            api,
            events,
            config,
            theme_id,
            entries: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn theme_id(&self) -> &str {
        &self.theme_id
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Queues `file` (unless it is null or skipped as unchanged) and hands it
    /// back.
    pub fn push(&mut self, file: SourceFile) -> SourceFile {
        if file.is_null() {
            return file;
        }

        if self.config.skip_unchanged && !file.is_changed() {
            log::debug!("Skipping unchanged {}", file.path().display());
            return file;
        }

        if let Some(entry) = map_file(&file, &self.config) {
            log::debug!("Queued {} -> {}", entry.source.display(), entry.location);
            self.entries.push(entry);
        }
        file
    }

    /// Sends every queued entry in one request. Never fails the caller: a
    /// remote or transport error is reported and returned as
    /// [`UploadOutcome::Failed`].
    pub async fn finish(self) -> UploadOutcome {
        let remote = match self.config.remote() {
            Ok(remote) => remote,
            Err(e) => return self.fail(RemoteError::Transport(e.to_string())),
        };

        let mut parts = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let contents = match fs::read(&entry.source).await {
                Ok(contents) => contents,
                Err(e) => {
                    return self.fail(RemoteError::Io {
                        path: entry.source.clone(),
                        message: e.to_string(),
                    });
                }
            };
            parts.push(UploadPart {
                location: entry.location.to_string(),
                file_name: entry.file_name().to_string(),
                contents,
            });
        }

        let response = match self
            .api
            .upload_resources(remote, &self.theme_id, parts)
            .await
        {
            Ok(response) => response,
            Err(e) => return self.fail(RemoteError::Transport(e.to_string())),
        };

        if response.status != StatusCode::CREATED {
            return self.fail(RemoteError::Status {
                status: response.status,
                body: response.body,
            });
        }

        let resources: Vec<serde_json::Value> = match serde_json::from_str(&response.body) {
            Ok(resources) => resources,
            Err(e) => return self.fail(RemoteError::InvalidResponse(e.to_string())),
        };

        for resource in &resources {
            log::info!("{resource}");
            if let Some(hook) = &self.config.hooks.success {
                hook(resource);
            }
        }
        log::info!(
            "{} {} files successfully uploaded",
            self.config.user_annotation(),
            resources.len()
        );
        self.events.emit(Event::Uploaded {
            count: resources.len(),
        });

        UploadOutcome::Uploaded(resources)
    }

    fn fail(&self, err: RemoteError) -> UploadOutcome {
        log::error!(
            "{} Error while uploading files: {err}",
            self.config.user_annotation()
        );
        if let Some(hook) = &self.config.hooks.error {
            hook(&err);
        }
        self.events.emit(Event::Error {
            message: err.to_string(),
        });
        UploadOutcome::Failed(err)
    }
}
