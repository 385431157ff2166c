//! Uploadcare HTTP client

use crate::error::{Result, UploadcareError};
use crate::types::{UploadResponse, UploadcareConfig, UploadedFile};
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use tracing::{debug, warn};

/// REST API version pinned through the Accept header
const API_ACCEPT: &str = "application/vnd.uploadcare-v0.7+json";

/// Client for the Uploadcare upload and REST APIs
pub struct UploadcareClient {
    http: reqwest::Client,
    config: UploadcareConfig,
}

impl UploadcareClient {
    /// Create a new client from project settings
    pub fn new(config: UploadcareConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { http, config }
    }

    /// Public CDN address of an uploaded file
    pub fn cdn_url(&self, file_id: &str, filename: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.cdn_base_url.trim_end_matches('/'),
            file_id,
            urlencoding::encode(filename)
        )
    }

    /// `Uploadcare.Simple` authorization header value
    fn authorization(&self) -> Result<String> {
        let secret = self
            .config
            .secret_key
            .as_deref()
            .ok_or(UploadcareError::MissingSecretKey)?;
        Ok(format!("Uploadcare.Simple {}:{}", self.config.public_key, secret))
    }

    /// Upload a file and store it permanently (until deleted)
    pub async fn upload(&self, data: Vec<u8>, filename: &str) -> Result<UploadedFile> {
        let url = format!("{}/base/", self.config.upload_base_url.trim_end_matches('/'));
        let size = data.len();

        let form = Form::new()
            .text("UPLOADCARE_PUB_KEY", self.config.public_key.clone())
            .text("UPLOADCARE_STORE", "1")
            .part("file", Part::bytes(data).file_name(filename.to_string()));

        debug!(url = %url, size, "Uploading file to Uploadcare");

        let response = self.http.post(&url).multipart(form).send().await?;
        let response = check_status(response).await?;

        let body = response.text().await?;
        let uploaded: UploadResponse = serde_json::from_str(&body)?;

        debug!(file_id = %uploaded.file, "Uploaded file to Uploadcare");

        Ok(UploadedFile {
            cdn_url: self.cdn_url(&uploaded.file, filename),
            file_id: uploaded.file,
        })
    }

    /// Delete a stored file. A file that is already gone counts as deleted.
    pub async fn delete(&self, file_id: &str) -> Result<()> {
        let authorization = self.authorization()?;
        let url = format!(
            "{}/files/{}/",
            self.config.api_base_url.trim_end_matches('/'),
            urlencoding::encode(file_id)
        );

        debug!(url = %url, "Deleting file from Uploadcare");

        let response = self
            .http
            .delete(&url)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .header(reqwest::header::ACCEPT, API_ACCEPT)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(file_id, "File already removed from Uploadcare");
            return Ok(());
        }

        check_status(response).await?;
        Ok(())
    }
}

/// Turn a non-2xx response into [`UploadcareError::Api`]
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(status = %status, body = %body, "Uploadcare request failed");
    Err(UploadcareError::Api {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Multipart, Path, State};
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::routing::{delete, post};
    use axum::{Json, Router};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorded {
        fields: HashMap<String, Vec<u8>>,
        file_name: Option<String>,
        deleted: Vec<(String, Option<String>, Option<String>)>,
    }

    type Shared = Arc<Mutex<Recorded>>;

    async fn fake_upload(
        State(rec): State<Shared>,
        mut multipart: Multipart,
    ) -> Json<serde_json::Value> {
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap_or_default().to_string();
            if let Some(file_name) = field.file_name() {
                rec.lock().unwrap().file_name = Some(file_name.to_string());
            }
            let data = field.bytes().await.unwrap();
            rec.lock().unwrap().fields.insert(name, data.to_vec());
        }
        Json(serde_json::json!({ "file": "0c1f4a1e-file" }))
    }

    async fn fake_delete(
        State(rec): State<Shared>,
        Path(id): Path<String>,
        headers: HeaderMap,
    ) -> AxumStatus {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        rec.lock()
            .unwrap()
            .deleted
            .push((id.clone(), header("authorization"), header("accept")));
        if id == "missing" {
            AxumStatus::NOT_FOUND
        } else {
            AxumStatus::OK
        }
    }

    async fn fake_reject() -> (AxumStatus, &'static str) {
        (AxumStatus::FORBIDDEN, "Invalid public key")
    }

    async fn spawn_fake(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn fake_uploadcare() -> (String, Shared) {
        let rec = Shared::default();
        let router = Router::new()
            .route("/base/", post(fake_upload))
            .route("/files/{id}/", delete(fake_delete))
            .with_state(rec.clone());
        (spawn_fake(router).await, rec)
    }

    #[test]
    fn test_cdn_url() {
        let client = UploadcareClient::new(
            UploadcareConfig::new("k").with_cdn_base_url("https://cdn.example.com/"),
        );
        assert_eq!(
            client.cdn_url("abc-123", "my image.png"),
            "https://cdn.example.com/abc-123/my%20image.png"
        );
    }

    #[test]
    fn test_authorization_uses_both_keys() {
        let client = UploadcareClient::new(UploadcareConfig::new("pub").with_secret_key("sec"));
        assert_eq!(client.authorization().unwrap(), "Uploadcare.Simple pub:sec");
    }

    #[tokio::test]
    async fn test_upload_sends_form_and_parses_file_id() {
        let (base, rec) = fake_uploadcare().await;
        let client = UploadcareClient::new(UploadcareConfig::new("pub").with_base_url(base));

        let file = client
            .upload(vec![0x89, 0x50, 0x4E, 0x47], "image.png")
            .await
            .unwrap();
        assert_eq!(file.file_id, "0c1f4a1e-file");
        assert_eq!(file.cdn_url, "https://ucarecdn.com/0c1f4a1e-file/image.png");

        let rec = rec.lock().unwrap();
        assert_eq!(rec.fields["UPLOADCARE_PUB_KEY"], b"pub");
        assert_eq!(rec.fields["UPLOADCARE_STORE"], b"1");
        assert_eq!(rec.fields["file"], vec![0x89, 0x50, 0x4E, 0x47]);
        assert_eq!(rec.file_name.as_deref(), Some("image.png"));
    }

    #[tokio::test]
    async fn test_upload_rejected_maps_to_api_error() {
        let base = spawn_fake(Router::new().route("/base/", post(fake_reject))).await;
        let client = UploadcareClient::new(UploadcareConfig::new("bad").with_base_url(base));

        let err = client.upload(b"data".to_vec(), "x.png").await.unwrap_err();
        match err {
            UploadcareError::Api { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "Invalid public key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_delete_sends_auth_headers() {
        let (base, rec) = fake_uploadcare().await;
        let client = UploadcareClient::new(
            UploadcareConfig::new("pub")
                .with_secret_key("sec")
                .with_base_url(base),
        );

        client.delete("0c1f4a1e-file").await.unwrap();

        let rec = rec.lock().unwrap();
        assert_eq!(rec.deleted.len(), 1);
        let (id, auth, accept) = &rec.deleted[0];
        assert_eq!(id, "0c1f4a1e-file");
        assert_eq!(auth.as_deref(), Some("Uploadcare.Simple pub:sec"));
        assert_eq!(accept.as_deref(), Some(API_ACCEPT));
    }

    #[tokio::test]
    async fn test_delete_missing_file_is_ok() {
        let (base, _rec) = fake_uploadcare().await;
        let client = UploadcareClient::new(
            UploadcareConfig::new("pub")
                .with_secret_key("sec")
                .with_base_url(base),
        );

        assert!(client.delete("missing").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_without_secret_key() {
        let client = UploadcareClient::new(UploadcareConfig::new("pub"));

        let err = client.delete("anything").await.unwrap_err();
        assert!(matches!(err, UploadcareError::MissingSecretKey));
    }
}
