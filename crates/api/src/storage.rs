//! Supabase Storage uploads for agent knowledge-base files

use std::time::Duration;

use reqwest::Client;
use time::OffsetDateTime;

/// Longest sanitised file-name component kept in an object name
const MAX_NAME_LEN: usize = 120;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage is not configured")]
    NotConfigured,
    #[error("Upload request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Upload rejected with {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// A file received with an agent form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Client for one Supabase Storage bucket
pub struct StorageClient {
    http: Client,
    supabase_url: String,
    service_role_key: String,
    bucket: String,
}

impl StorageClient {
    pub fn new(
        supabase_url: &str,
        service_role_key: &str,
        bucket: &str,
    ) -> Result<Self, StorageError> {
        let http = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self {
            http,
            supabase_url: supabase_url.trim_end_matches('/').to_string(),
            service_role_key: service_role_key.to_string(),
            bucket: bucket.to_string(),
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.service_role_key.is_empty()
    }

    pub fn public_url(&self, object_name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.supabase_url, self.bucket, object_name
        )
    }

    /// Upload one file and return its public URL
    pub async fn upload(&self, file: &UploadedFile) -> Result<String, StorageError> {
        if !self.is_configured() {
            tracing::error!("Supabase URL or service role key not configured");
            return Err(StorageError::NotConfigured);
        }

        let name = object_name(&file.file_name, OffsetDateTime::now_utc());
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.supabase_url, self.bucket, name
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.service_role_key)
            .header("apikey", &self.service_role_key)
            .header(
                reqwest::header::CONTENT_TYPE,
                file.content_type
                    .as_deref()
                    .unwrap_or("application/octet-stream"),
            )
            .body(file.bytes.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, object = %name, "Storage upload failed");
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(object = %name, size = file.bytes.len(), "Knowledge base file uploaded");
        Ok(self.public_url(&name))
    }

    /// Upload files in order; fails on the first rejected file
    pub async fn upload_all(&self, files: &[UploadedFile]) -> Result<Vec<String>, StorageError> {
        let mut urls = Vec::with_capacity(files.len());
        for file in files {
            urls.push(self.upload(file).await?);
        }
        Ok(urls)
    }
}

/// `{unix_millis}-{name}` with anything outside `[A-Za-z0-9._-]` replaced by `_`
pub fn object_name(file_name: &str, at: OffsetDateTime) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .trim();
    let mut safe: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_NAME_LEN)
        .collect();
    if safe.trim_matches(['.', '_']).is_empty() {
        safe = "file".to_string();
    }
    let millis = at.unix_timestamp_nanos() / 1_000_000;
    format!("{}-{}", millis, safe)
}
