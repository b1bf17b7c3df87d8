//! HTTP implementations of the match resolver and log archiver.

use crate::collaborators::{ArchiveRequest, LogArchiver, MatchListing, MatchResolver, RosterEntry};
use crate::config::{ServerSettings, DOMAIN_PLACEHOLDER};
use crate::error::CollaboratorError;
use async_trait::async_trait;
use log::debug;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Signature sent with every archived log.
pub const UPLOADER: &str = concat!("LogWatcher ", env!("CARGO_PKG_VERSION"));

/// File name of the log part in the upload form.
pub const UPLOAD_FILE_NAME: &str = "upload.log";

/// Builds the shared HTTP client with the configured timeout.
pub fn http_client(settings: &ServerSettings) -> Result<Client, reqwest::Error> {
    Client::builder().timeout(settings.request_timeout()).build()
}

/// Turns a non-2xx response into [`CollaboratorError::Status`].
async fn check_status(url: &str, response: Response) -> Result<Response, CollaboratorError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(CollaboratorError::Status {
        url: url.to_string(),
        status: status.as_u16(),
        body,
    })
}

#[derive(Debug, Deserialize)]
struct GamesPage {
    #[serde(default)]
    results: Vec<MatchListing>,
}

/// Client for the pickup platform API of every configured domain.
#[derive(Debug, Clone)]
pub struct PickupApi {
    client: Client,
    url_template: String,
}

impl PickupApi {
    pub fn new(client: Client, url_template: impl Into<String>) -> Self {
        Self {
            client,
            url_template: url_template.into(),
        }
    }

    /// `<api for domain>/<path>`
    pub fn endpoint(&self, domain: &str, path: &str) -> String {
        let base = self.url_template.replace(DOMAIN_PLACEHOLDER, domain);
        format!("{}/{}", base.trim_end_matches('/'), path)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, CollaboratorError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| CollaboratorError::Http {
                url: url.clone(),
                source,
            })?;

        check_status(&url, response)
            .await?
            .json::<T>()
            .await
            .map_err(|source| CollaboratorError::Decode { url, source })
    }
}

#[async_trait]
impl MatchResolver for PickupApi {
    async fn list_matches(&self, domain: &str) -> Result<Vec<MatchListing>, CollaboratorError> {
        let page: GamesPage = self.get_json(self.endpoint(domain, "games")).await?;
        Ok(page.results)
    }

    async fn fetch_roster(&self, domain: &str) -> Result<Vec<RosterEntry>, CollaboratorError> {
        self.get_json(self.endpoint(domain, "players")).await
    }
}

/// Posts finished match logs to logs.tf.
#[derive(Debug, Clone)]
pub struct LogsTfUploader {
    client: Client,
    url: String,
    key: String,
}

impl LogsTfUploader {
    pub fn new(client: Client, url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            key: key.into(),
        }
    }

    pub fn form(&self, request: &ArchiveRequest<'_>) -> Form {
        let logfile = Part::bytes(request.log.as_bytes().to_vec()).file_name(UPLOAD_FILE_NAME);

        Form::new()
            .text("title", request.title())
            .text("map", request.map.to_string())
            .text("key", self.key.clone())
            .part("logfile", logfile)
            .text("uploader", UPLOADER)
    }
}

#[async_trait]
impl LogArchiver for LogsTfUploader {
    async fn archive(&self, request: ArchiveRequest<'_>) -> Result<(), CollaboratorError> {
        debug!(
            "Uploading {} bytes for {} to {}",
            request.log.len(),
            request.title(),
            self.url
        );

        let response = self
            .client
            .post(&self.url)
            .multipart(self.form(&request))
            .send()
            .await
            .map_err(|source| CollaboratorError::Http {
                url: self.url.clone(),
                source,
            })?;

        check_status(&self.url, response).await?;
        Ok(())
    }
}
