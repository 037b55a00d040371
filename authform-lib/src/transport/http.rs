//! reqwest-backed transport

use async_trait::async_trait;
use log::debug;
use log::warn;
use reqwest::multipart::Form;
use reqwest::multipart::Part;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use super::Payload;
use super::PayloadValue;
use super::RequestConfig;
use super::Transport;
use super::TransportResponse;
use crate::error::TransportError;

/// Sends payloads over HTTP.
///
/// Payloads without files are sent as JSON; payloads with files are sent as
/// `multipart/form-data`. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http_client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with a default client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport that reuses an existing client.
    pub fn with_client(http_client: Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: &RequestConfig,
        payload: &Payload,
    ) -> Result<TransportResponse, TransportError> {
        let url = Url::parse(&request.url)
            .map_err(|e| TransportError::InvalidRequest(format!("{}: {e}", request.url)))?;

        debug!("{} {} ({} fields)", request.method, url, payload.len());

        let mut builder = self
            .http_client
            .request(request.method.into(), url)
            .header("Accept", "application/json");

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(timeout) = request.timeout() {
            builder = builder.timeout(timeout);
        }

        builder = if payload.has_files() {
            builder.multipart(multipart_form(payload)?)
        } else {
            builder.json(&payload.to_json())
        };

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body = parse_body(&text);

        if status.is_success() {
            Ok(TransportResponse::new(status.as_u16(), body))
        } else {
            warn!("Submission rejected with status {}", status.as_u16());
            Err(TransportError::http(status.as_u16(), body))
        }
    }
}

fn multipart_form(payload: &Payload) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for (key, value) in payload.iter() {
        form = match value {
            PayloadValue::File(file) => {
                let part = Part::bytes(file.bytes().to_vec())
                    .file_name(file.name().to_string())
                    .mime_str(file.mime())?;
                form.part(key.to_string(), part)
            }
            other => form.text(key.to_string(), other.to_form_text().unwrap_or_default()),
        };
    }
    Ok(form)
}

/// Parses a response body as JSON, keeping non-JSON text as a string.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
