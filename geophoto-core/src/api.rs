use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::albums::AlbumClient;
use crate::photos::PhotoClient;
use crate::{BackendConfig, Error, Session};

/// HTTP client for the photo backend.
///
/// Holds no credentials itself, every call takes the [`Session`] whose token
/// is attached and which gets invalidated on 401/403.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: BackendConfig,
}

#[derive(Debug)]
pub struct ApiClientBuilder {
    config: BackendConfig,
    timeout: Option<Duration>,
    client: Option<Client>,
}

impl ApiClientBuilder {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            config,
            timeout: None,
            client: None,
        }
    }

    /// Per-request timeout. Requests wait indefinitely when unset.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Use a preconfigured reqwest client (proxies, TLS roots, ...).
    #[must_use]
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> Result<ApiClient, Error> {
        let client = match self.client {
            Some(c) => c,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                builder
                    .build()
                    .map_err(|e| Error::Configuration(e.to_string()))?
            }
        };

        Ok(ApiClient {
            client,
            config: self.config,
        })
    }
}

impl ApiClient {
    pub fn new(config: BackendConfig) -> Result<Self, Error> {
        ApiClientBuilder::new(config).build()
    }

    pub fn builder(config: BackendConfig) -> ApiClientBuilder {
        ApiClientBuilder::new(config)
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    pub fn photos(&self) -> PhotoClient<'_> {
        PhotoClient::new(self)
    }

    pub fn albums(&self) -> AlbumClient<'_> {
        AlbumClient::new(self)
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.config.api_url(path))
    }

    /// Send `req` on behalf of `session` and sort the outcome into the error
    /// taxonomy. Only 2xx responses come back as `Ok`.
    pub(crate) async fn send(&self, session: &Session, req: RequestBuilder) -> Result<Response, Error> {
        let req = match session.token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        };

        let response = req.send().await.map_err(|e| {
            if e.is_builder() {
                Error::Configuration(e.to_string())
            } else {
                tracing::warn!("Backend unreachable: {}", e);
                Error::Network(e.to_string())
            }
        })?;

        let status = response.status();
        tracing::debug!("{} <- {}", status, response.url());

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            session.invalidate();
            return Err(Error::Auth {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        tracing::warn!("API error {}: {}", status, message);
        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        session: &Session,
        req: RequestBuilder,
    ) -> Result<T, Error> {
        let response = self.send(session, req).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| Error::Deserialization(e.to_string()))
    }

    /// Like [`send_json`](Self::send_json) for endpoints that may answer with
    /// an empty body (204).
    pub(crate) async fn send_optional_json<T: DeserializeOwned>(
        &self,
        session: &Session,
        req: RequestBuilder,
    ) -> Result<Option<T>, Error> {
        let response = self.send(session, req).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Deserialization(e.to_string()))?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|e| Error::Deserialization(e.to_string()))
    }
}

/// Best human-readable message for a failed response: the JSON `message`
/// (or `error`) field, else the raw body, else the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(serde_json::Value::String(message)) = map.get(key) {
                return message.clone();
            }
        }
    }

    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}
