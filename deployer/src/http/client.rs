//! HTTP client implementation shared by every remote adapter

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use api_models::models::ErrorResponse;
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};
use url::Url;

use crate::errors::DeployError;

/// How the credential is attached to each request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStyle {
    /// `Authorization: Bearer <token>`
    Bearer,
    /// Raw token in a custom header
    Header(&'static str),
}

/// Thin JSON client bound to one remote service
pub struct HttpClient {
    client: Client,
    service: &'static str,
    base_url: String,
    token: Option<SecretString>,
    auth: AuthStyle,
}

impl HttpClient {
    /// Create a new HTTP client.
    ///
    /// A missing token is reported on the first request, so services that a
    /// run never touches need no credentials.
    pub fn new(
        service: &'static str,
        base_url: &str,
        token: Option<SecretString>,
        auth: AuthStyle,
        extra_headers: &[(&'static str, &'static str)],
    ) -> Result<Self, DeployError> {
        Url::parse(base_url).map_err(|e| {
            DeployError::ConfigError(format!("invalid {} base url '{}': {}", service, base_url, e))
        })?;

        let mut headers = HeaderMap::new();
        for &(name, value) in extra_headers {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("branchdeploy/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            service,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            auth,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Name of the service used in errors and logs
    pub fn service(&self) -> &'static str {
        self.service
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, DeployError> {
        let token = self.token.as_ref().ok_or_else(|| {
            DeployError::ConfigError(format!("{} credentials are not configured", self.service))
        })?;

        Ok(match self.auth {
            AuthStyle::Bearer => request.header(
                header::AUTHORIZATION,
                format!("Bearer {}", token.expose_secret()),
            ),
            AuthStyle::Header(name) => request.header(name, token.expose_secret()),
        })
    }

    async fn send(&self, method: &str, request: RequestBuilder) -> Result<Response, DeployError> {
        let response = self.authorize(request)?.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.message)
                .unwrap_or_else(|_| body.clone());
            // Client errors reach the caller, which decides whether they matter
            if status.is_server_error() {
                error!("{} {} failed: {} - {}", self.service, method, status, message);
            } else {
                debug!("{} {} failed: {} - {}", self.service, method, status, message);
            }
            return Err(DeployError::Api {
                service: self.service,
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, DeployError> {
        let url = self.url(path);
        debug!("GET {}", url);

        let response = self.send("GET", self.client.get(&url)).await?;
        Ok(response.json().await?)
    }

    /// GET one page of a `Range`-paginated listing.
    ///
    /// Returns the page and the `Next-Range` value to request next, if any.
    pub async fn get_range<T: DeserializeOwned>(
        &self,
        path: &str,
        range: Option<&str>,
    ) -> Result<(T, Option<String>), DeployError> {
        let url = self.url(path);
        debug!("GET {} (range {:?})", url, range);

        let mut request = self.client.get(&url);
        if let Some(range) = range {
            request = request.header(header::RANGE, range);
        }
        let response = self.send("GET", request).await?;
        let next = response
            .headers()
            .get("next-range")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok((response.json().await?, next))
    }

    /// Make a GET request, mapping 404 to `None`
    pub async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, DeployError> {
        match self.get(path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Make a POST request
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, DeployError> {
        let url = self.url(path);
        debug!("POST {}", url);

        let response = self.send("POST", self.client.post(&url).json(body)).await?;
        Ok(response.json().await?)
    }

    /// Make a PUT request
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, DeployError> {
        let url = self.url(path);
        debug!("PUT {}", url);

        let response = self.send("PUT", self.client.put(&url).json(body)).await?;
        Ok(response.json().await?)
    }

    /// Make a PATCH request
    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, DeployError> {
        let url = self.url(path);
        debug!("PATCH {}", url);

        let response = self.send("PATCH", self.client.patch(&url).json(body)).await?;
        Ok(response.json().await?)
    }

    /// Make a DELETE request, discarding the response body
    pub async fn delete(&self, path: &str) -> Result<(), DeployError> {
        let url = self.url(path);
        debug!("DELETE {}", url);

        self.send("DELETE", self.client.delete(&url)).await?;
        Ok(())
    }
}
