//! API client for communicating with the vehicle-service admin REST API.
//!
//! `ApiClient` is the production [`Transport`]: it resolves paths against the
//! configured base URL, attaches the bearer token, and classifies non-2xx
//! responses into [`ApiError`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{header, Client, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::transport::{decode, HttpRequest, HttpUpload, Method, Transport};
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default base URL for the admin API
pub const DEFAULT_API_BASE_URL: &str = "https://dev.nabih.sa/api";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    data: Option<LoginData>,
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    token: String,
}

/// API client for the admin backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    initial_backoff: Duration,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
            initial_backoff: self.initial_backoff,
        }
    }

    /// Set the first delay after a 429. Each further retry doubles it.
    pub fn with_backoff(mut self, initial: Duration) -> Self {
        self.initial_backoff = initial;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Authenticate an admin and return the bearer token
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let request = HttpRequest::post(
            "auth/admin/login",
            &serde_json::json!({ "email": email, "password": password }),
        )?;
        let response: LoginResponse = decode(self.call(request).await?)?;

        response
            .data
            .map(|d| d.token)
            .or(response.token)
            .ok_or_else(|| ApiError::InvalidResponse("Login response carried no token".into()))
    }

    /// Revoke the current token
    pub async fn logout(&self) -> Result<(), ApiError> {
        let request = HttpRequest::post("auth/admin/logout", &serde_json::json!({}))?;
        self.call(request).await?;
        Ok(())
    }

    fn auth_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        if let Some(ref token) = self.token {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ApiError::Serialization(format!("Invalid bearer token: {}", e)))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    fn build(&self, request: &HttpRequest) -> Result<RequestBuilder, ApiError> {
        let url = self.url(&request.path);
        let builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };

        let mut builder = builder.headers(self.auth_headers()?);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }
        Ok(builder)
    }

    /// Multipart forms are single-use, so one is built for every attempt.
    fn build_upload(&self, upload: &HttpUpload) -> Result<RequestBuilder, ApiError> {
        let mut form = Form::new();
        for (name, value) in &upload.fields {
            form = form.text(name.clone(), value.clone());
        }
        if let Some(ref file) = upload.file {
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.file_name.clone())
                .mime_str(&file.mime)
                .map_err(|e| {
                    ApiError::Serialization(format!("Invalid content type {}: {}", file.mime, e))
                })?;
            form = form.part(file.field.clone(), part);
        }

        Ok(self
            .client
            .post(self.url(&upload.path))
            .headers(self.auth_headers()?)
            .multipart(form))
    }

    /// Send a request, retrying with exponential backoff while rate limited.
    async fn send_with_retry<F>(
        &self,
        method: Method,
        path: &str,
        build: F,
    ) -> Result<Value, ApiError>
    where
        F: Fn() -> Result<RequestBuilder, ApiError> + Send + Sync,
    {
        let mut retries = 0;
        let mut backoff = self.initial_backoff;

        loop {
            debug!(method = %method, path = %path, "Sending request");
            let response = build()?.send().await?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => return Self::read_json(response).await,
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited);
                    }
                    warn!(
                        path = %path,
                        retry = retries,
                        backoff_ms = backoff.as_millis() as u64,
                        "Rate limited, backing off"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2; // Exponential backoff
                }
            }
        }
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>, ApiError> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Read a successful response body. Empty bodies (e.g. 204) decode as null.
    async fn read_json(response: reqwest::Response) -> Result<Value, ApiError> {
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn call(&self, request: HttpRequest) -> Result<Value, ApiError> {
        self.send_with_retry(request.method, &request.path, || self.build(&request)).await
    }

    async fn upload(&self, upload: HttpUpload) -> Result<Value, ApiError> {
        self.send_with_retry(Method::Post, &upload.path, || self.build_upload(&upload)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FilePart;
    use wiremock::matchers::{
        body_json, body_string_contains, header, header_regex, method, path, query_param,
    };
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&format!("{}/api/", server.uri()), 5)
            .expect("client should build")
            .with_token("secret-token".to_string())
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = ApiClient::new("https://example.test/api/", 5).expect("client");
        assert_eq!(client.base_url(), "https://example.test/api");
        assert_eq!(
            client.url("/admins/vehicles"),
            "https://example.test/api/admins/vehicles"
        );
        assert_eq!(client.url("admins"), "https://example.test/api/admins");
    }

    #[tokio::test]
    async fn test_get_sends_bearer_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admins/vehicles"))
            .and(header("authorization", "Bearer secret-token"))
            .and(query_param("sort_field", "created_at"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "message": "ok",
                "data": {"vehicles": []}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let request = HttpRequest::get("admins/vehicles")
            .with_query(vec![("sort_field".into(), "created_at".into())]);
        let value = client.call(request).await.expect("call should succeed");
        assert_eq!(value["success"], true);
    }

    #[tokio::test]
    async fn test_put_sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/admins/support-requests/7"))
            .and(body_json(serde_json::json!({"status": "closed"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let request = HttpRequest::put(
            "admins/support-requests/7",
            &serde_json::json!({"status": "closed"}),
        )
        .expect("body encodes");
        client.call(request).await.expect("call should succeed");
    }

    #[tokio::test]
    async fn test_empty_body_decodes_as_null() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/admins/vehicles/3"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let value = client
            .call(HttpRequest::delete("admins/vehicles/3"))
            .await
            .expect("delete should succeed");
        assert!(value.is_null());
    }

    #[tokio::test]
    async fn test_error_status_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admins"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client
            .call(HttpRequest::get("admins"))
            .await
            .expect_err("401 should fail");
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn test_login_extracts_nested_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/admin/login"))
            .and(body_json(serde_json::json!({"email": "a@b.c", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "data": {"token": "fresh-token"}
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(&format!("{}/api", server.uri()), 5).expect("client");
        let token = client.login("a@b.c", "pw").await.expect("login should succeed");
        assert_eq!(token, "fresh-token");
    }

    #[tokio::test]
    async fn test_rate_limit_retries_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admins"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/admins"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server)
            .await
            .with_backoff(Duration::from_millis(5));
        let value = client
            .call(HttpRequest::get("admins"))
            .await
            .expect("second attempt should succeed");
        assert_eq!(value["success"], true);

        let received = server.received_requests().await.expect("recording enabled");
        assert_eq!(received.len(), 2);
    }

    #[tokio::test]
    async fn test_rate_limit_gives_up_after_max_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admins"))
            .respond_with(ResponseTemplate::new(429))
            .expect(u64::from(MAX_RATE_LIMIT_RETRIES) + 1)
            .mount(&server)
            .await;

        let client = client_for(&server)
            .await
            .with_backoff(Duration::from_millis(5));
        let err = client
            .call(HttpRequest::get("admins"))
            .await
            .expect_err("429 forever should fail");
        assert!(matches!(err, ApiError::RateLimited));

        let received = server.received_requests().await.expect("recording enabled");
        assert_eq!(received.len(), 4);
    }

    #[tokio::test]
    async fn test_upload_sends_multipart_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/admins/offers"))
            .and(header("authorization", "Bearer secret-token"))
            .and(header("accept", "application/json"))
            .and(header_regex("content-type", "^multipart/form-data; boundary="))
            .and(body_string_contains("name=\"title[en]\""))
            .and(body_string_contains("filename=\"banner.png\""))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "success": true,
                "message": "Offer created"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let upload = HttpUpload::new(
            "admins/offers",
            vec![("title[en]".into(), "Oil change".into())],
        )
        .with_file(FilePart {
            field: "image".into(),
            file_name: "banner.png".into(),
            mime: "image/png".into(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        });
        let value = client.upload(upload).await.expect("upload should succeed");
        assert_eq!(value["message"], "Offer created");
    }
}
