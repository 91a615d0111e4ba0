//! Internal HTTP client that attaches the session cookie and decodes backend errors.

use crate::{
    ConsoleConfig, ConsoleError, ConsoleResult, ValidationError,
    core::domain::{
        error::failure_message,
        value_object::{ApiBaseUrl, SessionCookie},
    },
};
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{Client, Method, Response, StatusCode, header};
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Internal HTTP client that talks to the goose'd API.
///
/// Every request carries the current session cookie, if one is set. Non-2xx
/// responses are turned into `ConsoleError::Api` (or `Authentication` for
/// 401/403) using the `error` field of the body when present.
#[derive(Debug)]
pub struct ApiClient {
    http_client: Client,
    base_url: Arc<ApiBaseUrl>,
    session: Arc<RwLock<Option<SessionCookie>>>,
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl ApiClient {
    /// Creates a new `ApiClient` from validated settings.
    ///
    /// # Errors
    /// Returns `ConsoleError::Validation` if the settings are invalid and
    /// `ConsoleError::Connection` if the HTTP client cannot be built.
    pub fn new(config: &ConsoleConfig) -> ConsoleResult<Self> {
        config.validate()?;
        let base_url = config.base_url()?;

        let http_client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ConsoleError::Connection(e.to_string()))?;

        let rate_limiter = match config.rate_limit {
            Some(rl) => {
                let per_second = non_zero("requests_per_second", rl.requests_per_second)?;
                let burst = non_zero("burst_size", rl.burst_size)?;
                let quota = Quota::per_second(per_second).allow_burst(burst);
                Some(Arc::new(DefaultDirectRateLimiter::direct(quota)))
            }
            None => None,
        };

        let session = config
            .session_cookie
            .as_deref()
            .map(SessionCookie::new)
            .transpose()?;

        Ok(Self {
            http_client,
            base_url: Arc::new(base_url),
            session: Arc::new(RwLock::new(session)),
            rate_limiter,
        })
    }

    /// Returns the resolved API base URL.
    pub fn base_url(&self) -> &ApiBaseUrl {
        &self.base_url
    }

    /// Replaces the session credentials sent with subsequent requests.
    pub async fn set_session(&self, session: Option<SessionCookie>) {
        let mut lock = self.session.write().await;
        *lock = session;
    }

    /// Returns `true` if a session cookie is set.
    pub async fn has_session(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Performs a GET request and decodes the JSON body.
    pub async fn get<T>(&self, path: &str) -> ConsoleResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self.execute_request(Method::GET, path, None::<&()>).await?;
        decode(response).await
    }

    /// Performs a POST request with a JSON body.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> ConsoleResult<T>
    where
        B: serde::Serialize,
        T: serde::de::DeserializeOwned,
    {
        let response = self.execute_request(Method::POST, path, Some(body)).await?;
        decode(response).await
    }

    /// Performs a PUT request with a JSON body.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> ConsoleResult<T>
    where
        B: serde::Serialize,
        T: serde::de::DeserializeOwned,
    {
        let response = self.execute_request(Method::PUT, path, Some(body)).await?;
        decode(response).await
    }

    /// Performs a DELETE request. Any response body is ignored.
    pub async fn delete(&self, path: &str) -> ConsoleResult<()> {
        self.execute_request(Method::DELETE, path, None::<&()>)
            .await
            .map(|_| ())
    }

    /// Core request execution: rate limiting, cookie, body and status handling.
    #[instrument(skip(self, body), fields(base = %self.base_url.as_str()))]
    async fn execute_request<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ConsoleResult<Response>
    where
        B: serde::Serialize,
    {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let url = self.base_url.endpoint(path)?;
        debug!(%method, path, "sending request");
        let mut req_builder = self
            .http_client
            .request(method, &url)
            .header(header::ACCEPT, "application/json");

        {
            let session = self.session.read().await;
            if let Some(cookie) = session.as_ref() {
                req_builder = req_builder.header(header::COOKIE, cookie.as_str());
            }
        }

        if let Some(body) = body {
            req_builder = req_builder.json(body);
        }

        let response = req_builder
            .send()
            .await
            .map_err(|e| ConsoleError::Connection(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        debug!(%status, "response received");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = failure_message(status.as_u16(), &body);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(ConsoleError::Authentication(message))
            }
            _ => Err(ConsoleError::Api {
                status: status.as_u16(),
                message,
            }),
        }
    }
}

async fn decode<T>(response: Response) -> ConsoleResult<T>
where
    T: serde::de::DeserializeOwned,
{
    response
        .json::<T>()
        .await
        .map_err(|e| ConsoleError::Payload(format!("Failed to parse response: {}", e)))
}

fn non_zero(field: &str, value: u32) -> Result<NonZeroU32, ValidationError> {
    NonZeroU32::new(value).ok_or_else(|| ValidationError::Field {
        field: field.to_string(),
        message: "Must be greater than zero".to_string(),
    })
}
