//! HTTP client for the task API

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::directory::UserDirectory;
use crate::error::ApiError;
use crate::error::LookupError;
use crate::model::CellValue;
use crate::model::GridData;
use crate::model::Row;
use crate::model::User;
use crate::response::ApiResponse;
use crate::response::RowPayload;
use crate::response::UpdateCellRequest;
use crate::response::UserPayload;
use crate::response::UsersPayload;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3001/api";

/// Client for the task API.
///
/// Cheap to clone. Every call is made once; failures are returned to the
/// caller without retrying.
///
/// # Example
///
/// ```ignore
/// let client = TaskGridClient::builder()
///     .url("http://127.0.0.1:3001/api")
///     .timeout(Duration::from_secs(10))
///     .build()?;
///
/// let grid = client.fetch_tasks().await?;
/// ```
#[derive(Clone)]
pub struct TaskGridClient {
    inner: Arc<TaskGridClientInner>,
}

struct TaskGridClientInner {
    base_url: Url,
    http_client: Client,
    timeout: Option<Duration>,
}

impl TaskGridClient {
    /// Creates a client with default settings.
    pub fn new(url: impl Into<String>) -> Result<Self, ApiError> {
        Self::builder().url(url).build()
    }

    pub fn builder() -> TaskGridClientBuilder<Missing> {
        TaskGridClientBuilder::new()
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Fetches the whole table.
    pub async fn fetch_tasks(&self) -> Result<GridData, ApiError> {
        self.request(Method::GET, &["tasks"], &[], None::<&()>)
            .await
    }

    /// Fetches one row.
    pub async fn fetch_task_row(&self, row_id: &str) -> Result<Row, ApiError> {
        let payload: RowPayload = self
            .request(Method::GET, &["tasks", row_id], &[], None::<&()>)
            .await?;
        Ok(payload.row)
    }

    /// Writes one cell and returns the updated row.
    pub async fn update_cell(
        &self,
        row_id: &str,
        column_id: &str,
        value: CellValue,
    ) -> Result<Row, ApiError> {
        let body = UpdateCellRequest { value };
        let payload: RowPayload = self
            .request(
                Method::PATCH,
                &["tasks", row_id, "cells", column_id],
                &[],
                Some(&body),
            )
            .await?;
        Ok(payload.row)
    }

    /// Searches users. An empty query lists the first users.
    pub async fn fetch_users(&self, query: &str) -> Result<Vec<User>, ApiError> {
        let params = if query.is_empty() {
            vec![]
        } else {
            vec![("query", query)]
        };
        let value: serde_json::Value = self
            .request(Method::GET, &["users"], &params, None::<&()>)
            .await?;

        // Either `{users: [...]}` or a bare array
        let users = match value {
            serde_json::Value::Array(_) => serde_json::from_value(value),
            other => serde_json::from_value::<UsersPayload>(other).map(|p| p.users),
        };
        users.map_err(|e| ApiError::parse(e.to_string()))
    }

    /// Fetches one user.
    pub async fn fetch_user(&self, user_id: &str) -> Result<User, ApiError> {
        let payload: UserPayload = self
            .request(Method::GET, &["users", user_id], &[], None::<&()>)
            .await?;
        Ok(payload.user)
    }

    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn request<T, B>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(segments, query)?;
        log::debug!("{} {}", method, url);

        let mut request = self.inner.http_client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            parse_body(&text)
        } else {
            Err(error_from_body(status.as_u16(), text))
        }
    }
}

impl std::fmt::Debug for TaskGridClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskGridClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl UserDirectory for TaskGridClient {
    async fn search_users(&self, query: &str) -> Result<Vec<User>, LookupError> {
        Ok(self.fetch_users(query).await?)
    }
}

/// Parses a success body, which is either the envelope or the bare payload.
fn parse_body<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| ApiError::parse_with_body(e.to_string(), text))?;

    let enveloped = value
        .as_object()
        .and_then(|o| o.get("status"))
        .is_some_and(serde_json::Value::is_string);

    if enveloped {
        let response: ApiResponse<T> = serde_json::from_value(value)
            .map_err(|e| ApiError::parse_with_body(e.to_string(), text))?;
        match response {
            ApiResponse::Success { data } => Ok(data),
            ApiResponse::Error {
                status_code,
                message,
                errors,
            } => Err(ApiError::Http {
                status: status_code,
                message,
                errors,
            }),
        }
    } else {
        serde_json::from_value(value).map_err(|e| ApiError::parse_with_body(e.to_string(), text))
    }
}

fn error_from_body(status: u16, text: String) -> ApiError {
    match serde_json::from_str::<ApiResponse<serde_json::Value>>(&text) {
        Ok(ApiResponse::Error {
            message, errors, ..
        }) => ApiError::Http {
            status,
            message,
            errors,
        },
        _ => ApiError::http(status, text),
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for [`TaskGridClient`]. The base URL is required.
pub struct TaskGridClientBuilder<U> {
    url: U,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl TaskGridClientBuilder<Missing> {
    pub fn new() -> Self {
        Self {
            url: Missing,
            timeout: None,
            connect_timeout: None,
            http_client: None,
        }
    }

    /// Sets the API base URL, e.g. `http://127.0.0.1:3001/api`.
    pub fn url(self, url: impl Into<String>) -> TaskGridClientBuilder<Set<String>> {
        TaskGridClientBuilder {
            url: Set(url.into()),
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl Default for TaskGridClientBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> TaskGridClientBuilder<U> {
    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout. Ignored when a custom client is given.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl TaskGridClientBuilder<Set<String>> {
    pub fn build(self) -> Result<TaskGridClient, ApiError> {
        let base_url = Url::parse(&self.url.0).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(self.url.0));
        }

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(TaskGridClient {
            inner: Arc::new(TaskGridClientInner {
                base_url,
                http_client,
                timeout: self.timeout,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_segments() {
        let client = TaskGridClient::new("http://localhost:3001/api/").unwrap();
        let url = client
            .endpoint(&["tasks", "row 1", "cells", "status"], &[])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3001/api/tasks/row%201/cells/status"
        );

        let url = client.endpoint(&["users"], &[("query", "a b")]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3001/api/users?query=a+b");
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            TaskGridClient::new("not a url"),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_parse_body_accepts_both_shapes() {
        let wrapped: UserPayload =
            parse_body(r#"{"status":"success","data":{"user":{"id":"u1","name":"A"}}}"#).unwrap();
        let bare: UserPayload = parse_body(r#"{"user":{"id":"u1","name":"A"}}"#).unwrap();
        assert_eq!(wrapped, bare);
    }

    #[test]
    fn test_error_from_body() {
        let err = error_from_body(
            400,
            r#"{"status":"error","statusCode":400,"message":"Validation failed","errors":{"query":"bad"}}"#
                .to_string(),
        );
        match err {
            ApiError::Http {
                status,
                message,
                errors,
            } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Validation failed");
                assert_eq!(errors.get("query").map(String::as_str), Some("bad"));
            }
            other => panic!("unexpected {:?}", other),
        }

        let err = error_from_body(502, "Bad Gateway".to_string());
        assert_eq!(err.status_code(), Some(502));
    }
}
