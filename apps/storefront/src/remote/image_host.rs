//! Image CDN uploads.
//!
//! One unsigned multipart POST per file. No retry, no chunking.

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::{RemoteError, RemoteResult};

/// A local file waiting to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Uploads one image and returns its public HTTPS URL.
    async fn upload(&self, image: &ImageUpload) -> RemoteResult<String>;
}

/// Uploads every image in parallel. Failed uploads are logged and
/// dropped; the surviving URLs keep their input order.
pub async fn upload_all(host: &dyn ImageHost, images: &[ImageUpload]) -> Vec<String> {
    let results = join_all(images.iter().map(|image| host.upload(image))).await;

    results
        .into_iter()
        .zip(images)
        .filter_map(|(result, image)| match result {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(file = %image.file_name, error = %e, "Image upload failed");
                None
            }
        })
        .collect()
}

// =============================================================================
// Cloudinary-compatible host
// =============================================================================

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

/// Unsigned uploads with an upload preset.
#[derive(Debug, Clone)]
pub struct CloudinaryHost {
    client: Client,
    upload_url: String,
    upload_preset: String,
}

impl CloudinaryHost {
    pub fn new(upload_url: impl Into<String>, upload_preset: impl Into<String>) -> Self {
        CloudinaryHost {
            client: Client::new(),
            upload_url: upload_url.into(),
            upload_preset: upload_preset.into(),
        }
    }
}

#[async_trait]
impl ImageHost for CloudinaryHost {
    #[instrument(skip(self, image), fields(file = %image.file_name, size = image.bytes.len()))]
    async fn upload(&self, image: &ImageUpload) -> RemoteResult<String> {
        let form = Form::new()
            .part(
                "file",
                Part::bytes(image.bytes.clone()).file_name(image.file_name.clone()),
            )
            .text("upload_preset", self.upload_preset.clone());

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: UploadResponse = response.json().await?;
        let url = body
            .secure_url
            .ok_or_else(|| RemoteError::Parse("Image upload failed".to_string()))?;

        debug!(url = %url, "Image uploaded");
        Ok(url)
    }
}
