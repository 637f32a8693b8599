//! REST client for the library backend.
//!
//! Every request carries `Content-Type: application/json` and, when a
//! token is present, `Authorization: Bearer <token>`. Non-2xx responses
//! are turned into `ApiError::Status` with the response body as message.

use crate::api::RecordSource;
use crate::error::ApiError;
use crate::models::{Book, Borrowing, LoginResponse, User};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_ERROR: &str = "API request failed";
const LOGIN_ERROR: &str = "Login failed";

/// Credential context handed to the client explicitly.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    token: Option<String>,
}

impl Credentials {
    /// No credentials; requests go out without an Authorization header.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Credentials carrying a bearer token. Blank tokens count as none.
    pub fn bearer(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            token: Some(token).filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// HTTP implementation of [`RecordSource`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    timeout_seconds: u64,
    credentials: Credentials,
    http_client: reqwest::Client,
}

impl ApiClient {
    /// Create a client for the backend at `base_url`.
    pub fn new(
        base_url: &str,
        timeout_seconds: u64,
        credentials: Credentials,
    ) -> Result<Self, ApiError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ApiError::InvalidUrl(base_url));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(ApiError::Request)?;

        debug!("API client for {} (timeout {}s)", base_url, timeout_seconds);

        Ok(Self {
            base_url,
            timeout_seconds,
            credentials,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// A copy of this client that sends the given credentials.
    pub fn with_credentials(&self, credentials: Credentials) -> Self {
        Self {
            credentials,
            ..self.clone()
        }
    }

    /// Exchange a username and password for a bearer token.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let url = self.url("/auth/login");
        info!("Logging in as {}", username);

        let request = self
            .http_client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(&LoginRequest { username, password });

        let response = self.send(request, &url).await?;
        let response = Self::check_status(response, LOGIN_ERROR).await?;

        Self::decode(response, "login response").await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(CONTENT_TYPE, "application/json");
        match self.credentials.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response, ApiError> {
        request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout {
                    url: url.to_string(),
                    seconds: self.timeout_seconds,
                }
            } else if e.is_connect() {
                ApiError::Connect {
                    url: self.base_url.clone(),
                }
            } else {
                ApiError::Request(e)
            }
        })
    }

    async fn check_status(response: Response, fallback: &str) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = if body.trim().is_empty() {
            fallback.to_string()
        } else {
            body
        };

        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    /// Read the body and parse it as JSON of the expected shape.
    async fn decode<T: DeserializeOwned>(
        response: Response,
        what: &'static str,
    ) -> Result<T, ApiError> {
        let body = response.bytes().await.map_err(ApiError::Request)?;
        serde_json::from_slice(&body).map_err(|source| ApiError::Decode { what, source })
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        what: &'static str,
    ) -> Result<Vec<T>, ApiError> {
        let url = self.url(path);
        debug!("GET {}", url);

        let request = self.authorized(self.http_client.get(&url));
        let response = self.send(request, &url).await?;
        let response = Self::check_status(response, DEFAULT_ERROR).await?;

        let records: Vec<T> = Self::decode(response, what).await?;

        debug!("GET {} returned {} {}", url, records.len(), what);
        Ok(records)
    }
}

#[async_trait]
impl RecordSource for ApiClient {
    async fn get_books(&self) -> Result<Vec<Book>, ApiError> {
        self.get_list("/books", "books").await
    }

    async fn get_users(&self) -> Result<Vec<User>, ApiError> {
        self.get_list("/users", "users").await
    }

    async fn get_borrowings(&self) -> Result<Vec<Borrowing>, ApiError> {
        self.get_list("/borrowings", "borrowings").await
    }

    async fn get_overdue_borrowings(&self) -> Result<Vec<Borrowing>, ApiError> {
        self.get_list("/borrowings/overdue", "overdue borrowings")
            .await
    }
}
