use std::fmt;

use anyhow::{Context, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Non-success reply from PostgREST. Carried inside `anyhow::Error` so store
/// backends can downcast it and tell write conflicts from outages.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: String,
}

impl ApiError {
    pub fn is_conflict(&self) -> bool {
        self.status == StatusCode::CONFLICT
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.status.as_u16() {
            401 | 403 => "Authentication error",
            404 => "Resource not found",
            _ => "API error",
        };
        write!(f, "{} ({}): {}", kind, self.status, self.body)
    }
}

impl std::error::Error for ApiError {}

/// Thin PostgREST client. Every request is made with the service key, so
/// row-level authorization is enforced by the cells rather than the database.
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            service_key: config.supabase_service_key.clone(),
        }
    }

    fn get_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert(
            "apikey",
            HeaderValue::from_str(&self.service_key).context("service key is not a valid header value")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.service_key))
                .context("service key is not a valid header value")?,
        );

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers()?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(ApiError {
                status,
                body: error_text,
            }
            .into());
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// GET a filtered table path, e.g. `/rest/v1/sessions?date=eq.2025-03-10`.
    pub async fn select<T>(&self, path: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        self.request(Method::GET, path, None).await
    }

    /// Write with `Prefer: return=representation` so the affected rows come back.
    pub async fn write_returning<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        self.request_with_headers(method, path, body, Some(headers)).await
    }

    /// Call a Postgres function exposed under `/rest/v1/rpc/`.
    pub async fn rpc<T>(&self, function: &str, params: Value) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/rpc/{}", function);
        self.request(Method::POST, &path, Some(params)).await
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}
