use crate::config::Remote;
use crate::events::{Event, EventKind, Notifier};
use crate::web_api::{ApiResponse, ApiResult, ThemeApi, TransportError, UploadPart};
use reqwest::StatusCode;
use std::sync::{Arc, Mutex};

type Canned = Option<Result<(StatusCode, String), String>>;

/// In-memory [`ThemeApi`] answering every call of a kind with the same
/// canned response and recording what it was asked.
#[derive(Default)]
pub struct MockApi {
    find: Canned,
    create: Canned,
    upload: Canned,
    delete: Canned,
    lookups: Mutex<usize>,
    created: Mutex<Vec<(String, String)>>,
    uploads: Mutex<Vec<(String, Vec<UploadPart>)>>,
    deletes: Mutex<Vec<String>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(mut self, status: StatusCode, body: &str) -> Self {
        self.find = Some(Ok((status, body.to_string())));
        self
    }

    pub fn find_fails(mut self, message: &str) -> Self {
        self.find = Some(Err(message.to_string()));
        self
    }

    pub fn create(mut self, status: StatusCode, body: &str) -> Self {
        self.create = Some(Ok((status, body.to_string())));
        self
    }

    pub fn upload(mut self, status: StatusCode, body: &str) -> Self {
        self.upload = Some(Ok((status, body.to_string())));
        self
    }

    pub fn upload_fails(mut self, message: &str) -> Self {
        self.upload = Some(Err(message.to_string()));
        self
    }

    pub fn delete(mut self, status: StatusCode) -> Self {
        self.delete = Some(Ok((status, String::new())));
        self
    }

    pub fn delete_fails(mut self, message: &str) -> Self {
        self.delete = Some(Err(message.to_string()));
        self
    }

    pub fn lookups(&self) -> usize {
        *self.lookups.lock().unwrap()
    }

    pub fn created(&self) -> Vec<(String, String)> {
        self.created.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<(String, Vec<UploadPart>)> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    fn answer(canned: &Canned, url: &str) -> ApiResult {
        match canned {
            Some(Ok((status, body))) => Ok(ApiResponse::new(*status, body.clone())),
            Some(Err(message)) => Err(TransportError {
                url: url.to_string(),
                message: message.clone(),
            }),
            None => Ok(ApiResponse::new(StatusCode::NOT_IMPLEMENTED, "")),
        }
    }
}

impl ThemeApi for MockApi {
    async fn find_theme(&self, remote: Remote<'_>, _name: &str, _scope: &str) -> ApiResult {
        *self.lookups.lock().unwrap() += 1;
        Self::answer(&self.find, remote.base_url)
    }

    async fn create_theme(&self, remote: Remote<'_>, name: &str, scope: &str) -> ApiResult {
        self.created
            .lock()
            .unwrap()
            .push((name.to_string(), scope.to_string()));
        Self::answer(&self.create, remote.base_url)
    }

    async fn upload_resources(
        &self,
        remote: Remote<'_>,
        theme_id: &str,
        parts: Vec<UploadPart>,
    ) -> ApiResult {
        self.uploads
            .lock()
            .unwrap()
            .push((theme_id.to_string(), parts));
        Self::answer(&self.upload, remote.base_url)
    }

    async fn delete_resources(&self, remote: Remote<'_>, theme_id: &str) -> ApiResult {
        self.deletes.lock().unwrap().push(theme_id.to_string());
        Self::answer(&self.delete, remote.base_url)
    }
}

/// Subscribes to every event kind and collects what is emitted.
pub fn record_events(events: &Notifier) -> Arc<Mutex<Vec<Event>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    for kind in [
        EventKind::Upload,
        EventKind::Uploaded,
        EventKind::Remove,
        EventKind::Removed,
        EventKind::Error,
    ] {
        let sink = seen.clone();
        events.on(kind, move |event| {
            sink.lock().unwrap().push(event.clone());
            Ok(())
        });
    }
    seen
}
