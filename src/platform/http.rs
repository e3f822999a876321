use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde::Serialize;

use crate::error::{AppError, Result};

/// Thin JSON-over-HTTP POST client shared by the PR creator and the webhook notifier.
#[derive(Debug, Clone)]
pub struct HttpJsonClient {
    client: reqwest::Client,
}

impl HttpJsonClient {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }

    /// POST `payload` as JSON with extra `headers`.
    ///
    /// Returns the parsed response body, or an empty object when the body is
    /// empty. Non-2xx responses become [`AppError::Http`].
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        payload: &T,
        headers: &[(&str, String)],
    ) -> Result<serde_json::Value> {
        let body = serde_json::to_vec(payload)?;
        self.post_json_bytes(url, body, headers).await
    }

    /// POST an already-encoded JSON body. Used when the exact bytes matter,
    /// e.g. for signing.
    pub async fn post_json_bytes(
        &self,
        url: &str,
        body: Vec<u8>,
        headers: &[(&str, String)],
    ) -> Result<serde_json::Value> {
        let mut header_map = HeaderMap::new();
        header_map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| AppError::Config(format!("Invalid header name {name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| AppError::Config(format!("Invalid value for header {name}: {e}")))?;
            header_map.insert(name, value);
        }

        let response = self
            .client
            .post(url)
            .headers(header_map)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(AppError::Http {
                status: status.as_u16(),
                url: url.to_string(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(serde_json::Value::Object(serde_json::Map::new()));
        }

        Ok(serde_json::from_str(&text)?)
    }
}
