//! HTTP client for the analysis backend
//!
//! Wraps every endpoint the terminal client uses. Requests share one
//! `reqwest::Client` with a cookie store, so session cookies set by the
//! backend are sent back on later calls.

use crate::api::types::{
    ChatRequest, ConversationDetail, ConversationSummary, ErrorBody, UploadResponse,
};
use crate::chat::backend::{ByteStream, ChatBackend};
use crate::config::ApiConfig;
use crate::error::{CsvChatError, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use std::path::Path;
use url::Url;

/// Client for the chat-with-CSV backend
///
/// # Examples
///
/// ```
/// use csvchat::api::ApiClient;
/// use csvchat::config::ApiConfig;
///
/// let client = ApiClient::new(&ApiConfig::default()).unwrap();
/// assert_eq!(client.base_url(), "http://localhost:8000/api");
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    /// Build a client from API configuration
    ///
    /// # Errors
    ///
    /// Returns error if the base URL cannot be resolved or the HTTP client
    /// cannot be initialised
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base = Url::parse(&config.resolved_base()?)?;

        let client = Client::builder()
            .cookie_store(true)
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| CsvChatError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized API client: base={}", base);

        Ok(Self { client, base })
    }

    /// Resolved API base
    pub fn base_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| CsvChatError::Config(format!("API base cannot be a base: {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Upload a CSV file and create a session
    ///
    /// # Errors
    ///
    /// Returns `CsvChatError::Validation` for a non-`.csv` path (no request
    /// is made), `CsvChatError::Upload` for transport failures and rejected
    /// uploads
    ///
    /// # Examples
    ///
    /// ```
    /// use csvchat::api::ApiClient;
    /// use csvchat::config::ApiConfig;
    /// use std::path::Path;
    ///
    /// # tokio_test::block_on(async {
    /// let client = ApiClient::new(&ApiConfig::default()).unwrap();
    ///
    /// // Rejected locally, no request is sent
    /// let result = client.upload(Path::new("report.xlsx")).await;
    /// assert!(result.is_err());
    /// # });
    /// ```
    pub async fn upload(&self, path: &Path) -> Result<UploadResponse> {
        let filename = validate_csv_path(path)?;
        let bytes = tokio::fs::read(path).await?;
        let url = self.endpoint(&["upload"])?;

        tracing::debug!("Uploading {} ({} bytes) to {}", filename, bytes.len(), url);

        let part = Part::bytes(bytes)
            .file_name(filename.clone())
            .mime_str("text/csv")?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Upload request failed: {}", e);
                CsvChatError::Upload(e.to_string())
            })?;

        if !response.status().is_success() {
            let (status, detail) = read_error(response).await;
            tracing::error!("Upload rejected with {}: {}", status, detail);
            return Err(CsvChatError::Upload(detail).into());
        }

        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|e| CsvChatError::Upload(format!("Invalid upload response: {}", e)))?;

        tracing::info!(
            "Uploaded {}: session={}, columns={}",
            upload.filename,
            upload.session_id,
            upload.columns.len()
        );

        Ok(upload)
    }

    /// List stored conversations
    pub async fn list_conversations(&self) -> Result<Vec<ConversationSummary>> {
        let response = self
            .client
            .get(self.endpoint(&["conversations"])?)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }

    /// Fetch title and messages of one conversation
    pub async fn get_conversation(&self, id: &str) -> Result<ConversationDetail> {
        let response = self
            .client
            .get(self.endpoint(&["conversations", id])?)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }

    /// Delete one conversation
    pub async fn delete_conversation(&self, id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.endpoint(&["conversations", id])?)
            .send()
            .await?;
        ensure_success(response).await?;
        tracing::info!("Deleted conversation {}", id);
        Ok(())
    }

    /// Send a chat message and return the streamed NDJSON reply body
    pub async fn open_chat_stream(&self, session_id: &str, message: &str) -> Result<ByteStream> {
        let url = self.endpoint(&["chat", session_id])?;
        tracing::debug!("Opening chat stream: {}", url);

        let response = self
            .client
            .post(url)
            .json(&ChatRequest { message })
            .send()
            .await
            .map_err(|e| CsvChatError::Stream(format!("chat request failed: {}", e)))?;
        let response = ensure_success(response).await?;

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| anyhow::Error::from(CsvChatError::Stream(e.to_string()))))
            .boxed())
    }
}

#[async_trait]
impl ChatBackend for ApiClient {
    async fn open_chat_stream(&self, session_id: &str, message: &str) -> Result<ByteStream> {
        ApiClient::open_chat_stream(self, session_id, message).await
    }

    async fn fetch_history(&self, session_id: &str) -> Result<ConversationDetail> {
        self.get_conversation(session_id).await
    }
}

/// Check that `path` names a `.csv` file and return its file name
///
/// This is a courtesy filter only; the backend validates again.
///
/// # Examples
///
/// ```
/// use csvchat::api::validate_csv_path;
/// use std::path::Path;
///
/// assert_eq!(validate_csv_path(Path::new("data/sales.csv")).unwrap(), "sales.csv");
/// assert!(validate_csv_path(Path::new("sales.xlsx")).is_err());
/// ```
pub fn validate_csv_path(path: &Path) -> Result<String> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();

    if !filename.ends_with(".csv") {
        return Err(CsvChatError::Validation("Please upload a CSV file.".to_string()).into());
    }

    Ok(filename.to_string())
}

async fn ensure_success(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let (status, message) = read_error(response).await;
    Err(CsvChatError::Api { status, message }.into())
}

/// Status code and best-effort detail of a failed response
async fn read_error(response: Response) -> (u16, String) {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let detail = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.detail)
        .map(|detail| match detail {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        });

    let message = detail.unwrap_or_else(|| {
        status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.to_string())
    });

    (status.as_u16(), message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with_base(base: &str) -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: base.to_string(),
            ..ApiConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let client = client_with_base("http://localhost:8000/api/");
        assert_eq!(
            client.endpoint(&["conversations", "abc"]).unwrap().as_str(),
            "http://localhost:8000/api/conversations/abc"
        );
    }

    #[test]
    fn test_endpoint_escapes_session_id() {
        let client = client_with_base("http://localhost:8000/api");
        assert_eq!(
            client.endpoint(&["chat", "a b/c"]).unwrap().as_str(),
            "http://localhost:8000/api/chat/a%20b%2Fc"
        );
    }

    #[test]
    fn test_relative_base_uses_origin() {
        let client = ApiClient::new(&ApiConfig {
            origin: "http://proxy:8080".to_string(),
            ..ApiConfig::default()
        })
        .unwrap();
        assert_eq!(client.base_url(), "http://proxy:8080/api");
    }

    #[test]
    fn test_validate_csv_path_rejects_other_suffixes() {
        for bad in ["data.txt", "data.CSV", "csv", "data.csv.gz"] {
            let err = validate_csv_path(Path::new(bad)).unwrap_err();
            assert!(
                matches!(
                    err.downcast_ref::<CsvChatError>(),
                    Some(CsvChatError::Validation(_))
                ),
                "{} should be rejected",
                bad
            );
        }
    }

    #[tokio::test]
    async fn test_upload_rejects_before_network() {
        // Port 9 (discard) is never contacted: validation fails first
        let client = client_with_base("http://127.0.0.1:9/api");
        let err = client.upload(Path::new("report.xlsx")).await.unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Please upload a CSV file.");
    }
}
