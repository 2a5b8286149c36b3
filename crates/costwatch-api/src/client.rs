//! REST client for the backend
//!
//! [`CostApi`] is the seam the rest of the workspace programs against;
//! [`HttpApi`] is the reqwest-backed implementation. All requests flow
//! through one helper so error handling is uniform: non-2xx responses
//! are turned into [`ApiError::Server`] carrying the backend's `detail`
//! string when present, else a message derived from the status line.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use costwatch_schema::ProviderKind;

use crate::error::ApiError;
use crate::models::{Alert, Check, DataSource};

/// Body of `POST /api/parse-query`.
#[derive(Debug, Clone, Serialize)]
pub struct ParseQueryRequest {
    /// Natural-language check description
    pub query: String,
    /// Data source the check should run against
    #[serde(rename = "dataSourceId", skip_serializing_if = "Option::is_none")]
    pub data_source_id: Option<String>,
}

/// Body of `POST /api/datasources`.
#[derive(Debug, Clone, Serialize)]
pub struct NewDataSource {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ProviderKind,
    /// Normalized configuration from the schema registry
    pub config: serde_json::Value,
}

/// The backend operations this client consumes.
#[async_trait]
pub trait CostApi: Send + Sync {
    async fn list_checks(&self) -> Result<Vec<Check>, ApiError>;
    async fn list_alerts(&self) -> Result<Vec<Alert>, ApiError>;
    async fn list_data_sources(&self) -> Result<Vec<DataSource>, ApiError>;

    /// Submit a query to the parse service; the returned [`Check`] is
    /// authoritative and is the only way a check is created or updated.
    async fn parse_query(&self, request: ParseQueryRequest) -> Result<Check, ApiError>;

    async fn delete_check(&self, id: &str) -> Result<(), ApiError>;
    async fn pause_check(&self, id: &str) -> Result<(), ApiError>;
    async fn resume_check(&self, id: &str) -> Result<(), ApiError>;

    async fn create_data_source(&self, request: NewDataSource) -> Result<DataSource, ApiError>;
    async fn delete_data_source(&self, id: &str) -> Result<(), ApiError>;
}

/// reqwest-backed [`CostApi`] implementation.
#[derive(Debug, Clone)]
pub struct HttpApi {
    base: String,
    http: reqwest::Client,
}

impl HttpApi {
    /// Create a client for a backend at `base_url` (no trailing `/api`).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Rebuild with a per-request timeout. The default client imposes
    /// none, matching the backend's behavior of never retrying.
    ///
    /// # Errors
    /// Propagates client construction failure.
    pub fn with_timeout(self, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, ..self })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{path}", self.base.trim_end_matches('/'))
    }

    /// Issue a request and decode the success body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        if response.status().is_success() {
            Ok(response.json::<T>().await?)
        } else {
            Err(server_error(response).await)
        }
    }

    /// Issue a request whose success body is implementation-defined and
    /// ignored.
    async fn send_ack(&self, request: reqwest::RequestBuilder) -> Result<(), ApiError> {
        let response = request.send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(server_error(response).await)
        }
    }
}

#[async_trait]
impl CostApi for HttpApi {
    async fn list_checks(&self) -> Result<Vec<Check>, ApiError> {
        self.send(self.http.get(self.url("/checks"))).await
    }

    async fn list_alerts(&self) -> Result<Vec<Alert>, ApiError> {
        self.send(self.http.get(self.url("/alerts"))).await
    }

    async fn list_data_sources(&self) -> Result<Vec<DataSource>, ApiError> {
        self.send(self.http.get(self.url("/datasources"))).await
    }

    async fn parse_query(&self, request: ParseQueryRequest) -> Result<Check, ApiError> {
        self.send(self.http.post(self.url("/parse-query")).json(&request))
            .await
    }

    async fn delete_check(&self, id: &str) -> Result<(), ApiError> {
        self.send_ack(self.http.delete(self.url(&format!("/checks/{id}"))))
            .await
    }

    async fn pause_check(&self, id: &str) -> Result<(), ApiError> {
        self.send_ack(self.http.post(self.url(&format!("/checks/{id}/pause"))))
            .await
    }

    async fn resume_check(&self, id: &str) -> Result<(), ApiError> {
        self.send_ack(self.http.post(self.url(&format!("/checks/{id}/resume"))))
            .await
    }

    async fn create_data_source(&self, request: NewDataSource) -> Result<DataSource, ApiError> {
        self.send(self.http.post(self.url("/datasources")).json(&request))
            .await
    }

    async fn delete_data_source(&self, id: &str) -> Result<(), ApiError> {
        self.send_ack(self.http.delete(self.url(&format!("/datasources/{id}"))))
            .await
    }
}

/// Turn a non-2xx response into [`ApiError::Server`].
async fn server_error(response: reqwest::Response) -> ApiError {
    let status = response.status();
    let body = response.bytes().await.unwrap_or_default();
    let detail = extract_detail(&body).unwrap_or_else(|| fallback_detail(status));
    tracing::debug!(status = status.as_u16(), %detail, "request rejected");
    ApiError::Server {
        status: status.as_u16(),
        detail,
    }
}

/// Error body shape the backend uses for every failure.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// Pull the `detail` string out of an error body, if there is one.
fn extract_detail(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body).ok()?.detail
}

/// Generic message derived from the HTTP status line.
fn fallback_detail(status: StatusCode) -> String {
    format!("request failed with status {status}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn url_joining_tolerates_trailing_slash() {
        let api = HttpApi::new("http://localhost:8000/");
        assert_eq!(api.url("/checks"), "http://localhost:8000/api/checks");

        let api = HttpApi::new("http://localhost:8000");
        assert_eq!(
            api.url("/checks/chk-1/pause"),
            "http://localhost:8000/api/checks/chk-1/pause"
        );
    }

    #[test]
    fn detail_is_extracted_when_present() {
        let body = br#"{"detail": "Check not found"}"#;
        assert_eq!(extract_detail(body), Some("Check not found".to_string()));
    }

    #[test]
    fn missing_or_malformed_detail_falls_back_to_status() {
        assert_eq!(extract_detail(br#"{}"#), None);
        assert_eq!(extract_detail(b"<html>nope</html>"), None);

        let fallback = fallback_detail(StatusCode::BAD_GATEWAY);
        assert_eq!(fallback, "request failed with status 502 Bad Gateway");
    }

    #[test]
    fn parse_query_request_omits_absent_data_source() {
        let with = ParseQueryRequest {
            query: "watch spend".to_string(),
            data_source_id: Some("ds-1".to_string()),
        };
        let json = serde_json::to_value(&with).unwrap();
        assert_eq!(json["dataSourceId"], "ds-1");

        let without = ParseQueryRequest {
            query: "watch spend".to_string(),
            data_source_id: None,
        };
        let json = serde_json::to_value(&without).unwrap();
        assert!(json.get("dataSourceId").is_none());
    }
}
