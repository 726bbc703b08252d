//! MyMemory lookup backend.
//! One GET per lookup, connection pooling via reqwest. No retry and no
//! client-side timeout; a hung request is bounded only by the transport.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{LookupBackend, LookupError, LookupRequest};

const DEFAULT_BASE_URL: &str = "https://api.mymemory.translated.net";

pub struct MyMemoryClient {
    http: reqwest::Client,
    base_url: String,
}

impl MyMemoryClient {
    pub fn new() -> Result<Self, LookupError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against a custom endpoint (test servers, proxies).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, LookupError> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .build()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl LookupBackend for MyMemoryClient {
    async fn lookup(&self, request: &LookupRequest) -> Result<String, LookupError> {
        let langpair = format!("{}|{}", request.source_lang, request.target_lang);
        let response = self
            .http
            .get(format!("{}/get", self.base_url))
            .query(&[("q", request.word.as_str()), ("langpair", &langpair)])
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let translated = extract_translation(&body)?;
        debug!(word = %request.word, langpair, "mymemory_lookup_ok");
        Ok(translated)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupBody {
    /// 200 on success; the endpoint reports it as a number or a string.
    response_status: serde_json::Value,
    response_data: Option<ResponseData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseData {
    translated_text: Option<String>,
}

/// Parse the response body and pull out the translated text.
/// Anything other than an in-body status of 200 with a text payload is an error.
fn extract_translation(body: &str) -> Result<String, LookupError> {
    let parsed: LookupBody =
        serde_json::from_str(body).map_err(|e| LookupError::Malformed(e.to_string()))?;

    if !status_is_ok(&parsed.response_status) {
        return Err(LookupError::Api(format!(
            "responseStatus {}",
            parsed.response_status
        )));
    }

    parsed
        .response_data
        .and_then(|d| d.translated_text)
        .ok_or_else(|| LookupError::Malformed("missing translatedText".to_string()))
}

/// The success indicator arrives as `200` or `"200"` depending on the path
/// that produced the response.
fn status_is_ok(status: &serde_json::Value) -> bool {
    match status {
        serde_json::Value::Number(n) => n.as_i64() == Some(200),
        serde_json::Value::String(s) => s == "200",
        _ => false,
    }
}
