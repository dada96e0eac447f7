//! The Scroll Viewport REST API.
//!
//! [`ThemeApi`] only transports requests and hands back the raw status and
//! body. Classifying statuses is up to the callers.

use crate::config::Remote;
use reqwest::{
    StatusCode, Url,
    header::CONTENT_TYPE,
    multipart::{Form, Part},
};
use serde::Serialize;

pub const API_PREFIX: &str = "/rest/scroll-viewport/1.0";

/// Status and body of a finished request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// A request that never produced a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub url: String,
    pub message: String,
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.url, self.message)
    }
}

pub type ApiResult = Result<ApiResponse, TransportError>;

/// One file of an upload request. `location` and `contents` travel as the
/// `locations` and `files` fields of the same index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPart {
    pub location: String,
    pub file_name: String,
    pub contents: Vec<u8>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateThemeBody<'a> {
    name: &'a str,
    scope: &'a str,
    add_starter_files: bool,
}

#[allow(async_fn_in_trait)]
pub trait ThemeApi: Send + Sync {
    async fn find_theme(&self, remote: Remote<'_>, name: &str, scope: &str) -> ApiResult;

    async fn create_theme(&self, remote: Remote<'_>, name: &str, scope: &str) -> ApiResult;

    async fn upload_resources(
        &self,
        remote: Remote<'_>,
        theme_id: &str,
        parts: Vec<UploadPart>,
    ) -> ApiResult;

    async fn delete_resources(&self, remote: Remote<'_>, theme_id: &str) -> ApiResult;
}

pub fn theme_url(base_url: &str) -> String {
    format!("{base_url}{API_PREFIX}/theme")
}

pub fn theme_by_name_url(base_url: &str, name: &str, scope: &str) -> Result<Url, TransportError> {
    let raw = theme_url(base_url);
    let mut url = Url::parse(&raw).map_err(|e| TransportError {
        url: raw.clone(),
        message: e.to_string(),
    })?;
    url.query_pairs_mut()
        .append_pair("name", name)
        .append_pair("scope", scope);
    Ok(url)
}

pub fn resources_url(base_url: &str, theme_id: &str) -> String {
    format!("{}/{theme_id}/resource", theme_url(base_url))
}

/// [`ThemeApi`] over HTTP with Basic authentication on every request.
#[derive(Debug, Clone, Default)]
pub struct HttpApi {
    client: reqwest::Client,
}

impl HttpApi {
    pub fn new() -> Self {
        Self::default()
    }

    async fn send(&self, request: reqwest::RequestBuilder, url: &str) -> ApiResult {
        let transport = |e: reqwest::Error| TransportError {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;

        log::debug!("{url} -> {status}");
        Ok(ApiResponse { status, body })
    }
}

impl ThemeApi for HttpApi {
    async fn find_theme(&self, remote: Remote<'_>, name: &str, scope: &str) -> ApiResult {
        let url = theme_by_name_url(remote.base_url, name, scope)?;
        let request = self
            .client
            .get(url.clone())
            .basic_auth(remote.username, Some(remote.password));

        self.send(request, url.as_str()).await
    }

    async fn create_theme(&self, remote: Remote<'_>, name: &str, scope: &str) -> ApiResult {
        let url = theme_url(remote.base_url);
        let body = serde_json::to_vec(&CreateThemeBody {
            name,
            scope,
            add_starter_files: false,
        })
        .map_err(|e| TransportError {
            url: url.clone(),
            message: e.to_string(),
        })?;

        let request = self
            .client
            .post(&url)
            .basic_auth(remote.username, Some(remote.password))
            .header(CONTENT_TYPE, "application/json")
            .body(body);

        self.send(request, &url).await
    }

    async fn upload_resources(
        &self,
        remote: Remote<'_>,
        theme_id: &str,
        parts: Vec<UploadPart>,
    ) -> ApiResult {
        let url = resources_url(remote.base_url, theme_id);

        let mut form = Form::new();
        let mut locations = Vec::with_capacity(parts.len());
        for part in parts {
            form = form.part("files", Part::bytes(part.contents).file_name(part.file_name));
            locations.push(part.location);
        }
        for location in locations {
            form = form.text("locations", location);
        }

        let request = self
            .client
            .post(&url)
            .basic_auth(remote.username, Some(remote.password))
            .multipart(form);

        self.send(request, &url).await
    }

    async fn delete_resources(&self, remote: Remote<'_>, theme_id: &str) -> ApiResult {
        let url = resources_url(remote.base_url, theme_id);
        let request = self
            .client
            .delete(&url)
            .basic_auth(remote.username, Some(remote.password));

        self.send(request, &url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_paths_from_parts() {
        assert_eq!(
            theme_url("https://wiki.example/confluence"),
            "https://wiki.example/confluence/rest/scroll-viewport/1.0/theme"
        );
        assert_eq!(
            resources_url("https://wiki.example", "1234"),
            "https://wiki.example/rest/scroll-viewport/1.0/theme/1234/resource"
        );
    }

    #[test]
    fn theme_lookup_encodes_query() {
        let url = theme_by_name_url("https://wiki.example", "my theme", "").unwrap();
        assert_eq!(
            url.as_str(),
            "https://wiki.example/rest/scroll-viewport/1.0/theme?name=my+theme&scope="
        );
    }

    #[test]
    fn invalid_base_url_is_a_transport_error() {
        let err = theme_by_name_url("not a url", "t", "").unwrap_err();
        assert!(err.url.starts_with("not a url"));
    }

    #[test]
    fn create_body_uses_camel_case() {
        let body = serde_json::to_value(CreateThemeBody {
            name: "t",
            scope: "DOCS",
            add_starter_files: false,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"name": "t", "scope": "DOCS", "addStarterFiles": false})
        );
    }
}
