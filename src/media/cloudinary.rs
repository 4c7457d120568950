use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};

use super::{MediaError, MediaUploader, TempUpload, UploadedMedia};

const API_BASE_URL: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

/// Client d'upload Cloudinary (upload signé, `resource_type` auto).
pub struct CloudinaryUploader {
    client: reqwest::Client,
    config: CloudinaryConfig,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    url: String,
    #[serde(default)]
    secure_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl CloudinaryUploader {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            base_url: API_BASE_URL.to_string(),
        }
    }

    fn upload_url(&self) -> String {
        format!("{}/{}/auto/upload", self.base_url, self.config.cloud_name)
    }

    /// Signature Cloudinary: SHA-1 hex des paramètres triés, suivis du secret.
    fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
        let mut params = params.to_vec();
        params.sort_by_key(|(key, _)| *key);

        let to_sign = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha1::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl MediaUploader for CloudinaryUploader {
    async fn upload(&self, file: TempUpload) -> Result<UploadedMedia, MediaError> {
        // `file` est détruit en fin de fonction: le fichier local part avec lui
        let bytes = tokio::fs::read(file.path()).await?;

        let timestamp = Utc::now().timestamp().to_string();
        let signature = Self::sign(&[("timestamp", timestamp.as_str())], &self.config.api_secret);

        let mut part = Part::bytes(bytes).file_name(file.file_name().to_string());
        if let Some(content_type) = file.content_type() {
            part = part.mime_str(content_type)?;
        }

        let form = Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature);

        let response = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .map_or_else(|_| status.to_string(), |body| body.error.message);
            tracing::warn!(file = file.file_name(), %status, %message, "Cloudinary rejected upload");
            return Err(MediaError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: UploadResponse = response.json().await?;
        tracing::info!(
            file = file.file_name(),
            public_id = %body.public_id,
            "File uploaded to Cloudinary"
        );

        Ok(UploadedMedia {
            url: body.secure_url.unwrap_or(body.url),
            public_id: body.public_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uploader() -> CloudinaryUploader {
        CloudinaryUploader::new(CloudinaryConfig {
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: "abcd".to_string(),
        })
    }

    #[test]
    fn upload_url_targets_auto_resource_type() {
        assert_eq!(
            uploader().upload_url(),
            "https://api.cloudinary.com/v1_1/demo/auto/upload"
        );
    }

    #[test]
    fn signature_is_sha1_hex_of_sorted_params_and_secret() {
        let signature = CloudinaryUploader::sign(&[("timestamp", "1315060510")], "abcd");

        let mut hasher = Sha1::new();
        hasher.update(b"timestamp=1315060510abcd");
        assert_eq!(signature, hex::encode(hasher.finalize()));
        assert_eq!(signature.len(), 40);
    }

    #[test]
    fn signature_does_not_depend_on_param_order() {
        let a = CloudinaryUploader::sign(&[("timestamp", "1"), ("folder", "avatars")], "s");
        let b = CloudinaryUploader::sign(&[("folder", "avatars"), ("timestamp", "1")], "s");
        assert_eq!(a, b);
        assert_ne!(a, CloudinaryUploader::sign(&[("timestamp", "1"), ("folder", "avatars")], "t"));
    }

    #[test]
    fn upload_response_prefers_secure_url() {
        let body: UploadResponse = serde_json::from_str(
            r#"{"public_id":"abc","url":"http://res.cloudinary.com/x.png","secure_url":"https://res.cloudinary.com/x.png"}"#,
        )
        .unwrap();
        assert_eq!(body.secure_url.as_deref(), Some("https://res.cloudinary.com/x.png"));
    }

    #[tokio::test]
    async fn failed_upload_still_removes_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let upload = TempUpload::write(dir.path(), "avatar.png", None, b"bytes").unwrap();
        let path = upload.path().to_path_buf();

        let mut unreachable = uploader();
        unreachable.base_url = "http://127.0.0.1:9".to_string();

        let result = unreachable.upload(upload).await;

        assert!(result.is_err());
        assert!(!path.exists());
    }
}
