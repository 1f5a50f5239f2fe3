//! Media upload collaborator.
//!
//! Resolved image bytes are handed to an external store before the
//! transclusion reference is rendered. The wire shape follows DokuWiki's
//! media manager: a multipart POST with the file under `qqfile` plus fixed
//! control fields selecting upload semantics and overwrite-if-exists.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::UploadError;

/// Destination for resolved image bytes.
///
/// There is no retry anywhere: a failed upload is reported once and the
/// image degrades to a comment fragment.
#[async_trait(?Send)]
pub trait MediaUploader {
    /// Store `bytes` under `file_name`. On success the supplied name is
    /// authoritative and already of record.
    async fn upload(&self, file_name: &str, content_type: &str, bytes: Vec<u8>) -> Result<(), UploadError>;
}

/// Uploader used when no endpoint is configured; every image degrades.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoUploader;

#[async_trait(?Send)]
impl MediaUploader for NoUploader {
    async fn upload(&self, _file_name: &str, _content_type: &str, _bytes: Vec<u8>) -> Result<(), UploadError> {
        Err(UploadError::Rejected("no upload endpoint configured".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// Multipart uploader against a DokuWiki-style media endpoint.
#[derive(Debug, Clone)]
pub struct HttpUploader {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpUploader {
    /// Uploader posting to `endpoint` (typically `…/lib/exe/ajax.php`).
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait(?Send)]
impl MediaUploader for HttpUploader {
    async fn upload(&self, file_name: &str, content_type: &str, bytes: Vec<u8>) -> Result<(), UploadError> {
        debug!(file_name, content_type, size = bytes.len(), "uploading media");

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|err| UploadError::Transport(err.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .text("call", "mediaupload")
            .text("ow", "true")
            .part("qqfile", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|err| UploadError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, file_name, "media endpoint returned failure status");
            return Err(UploadError::Rejected(format!("HTTP {status}")));
        }

        // An empty or non-JSON body counts as success; only a truthy
        // `error` field is a rejection.
        let body = response
            .text()
            .await
            .map_err(|err| UploadError::Transport(err.to_string()))?;
        if let Ok(parsed) = serde_json::from_str::<UploadResponse>(&body) {
            if let Some(error) = parsed.error {
                let truthy = match &error {
                    serde_json::Value::Null => false,
                    serde_json::Value::Bool(b) => *b,
                    serde_json::Value::String(s) => !s.is_empty(),
                    serde_json::Value::Number(n) => n.as_f64() != Some(0.0),
                    _ => true,
                };
                if truthy {
                    let reason = match error {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    warn!(file_name, reason, "media endpoint rejected upload");
                    return Err(UploadError::Rejected(reason));
                }
            }
        }

        debug!(file_name, "upload accepted");
        Ok(())
    }
}
