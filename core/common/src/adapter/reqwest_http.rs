//! reqwest（blocking）による HttpClient 実装

use crate::error::Error;
use crate::ports::outbound::{HttpBody, HttpClient, HttpRequest, HttpResponse};
use crate::redact::redact_secrets;
use reqwest::blocking::multipart::Form;

/// reqwest の blocking クライアントで送る HttpClient
///
/// タイムアウトは reqwest の既定のまま。
pub struct ReqwestHttpClient {
    client: reqwest::blocking::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestHttpClient {
    fn post(&self, request: &HttpRequest) -> Result<HttpResponse, Error> {
        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &request.body {
            HttpBody::Json(value) => builder
                .header("Content-Type", "application/json")
                .body(value.to_string()),
            HttpBody::Multipart(fields) => {
                let form = fields
                    .iter()
                    .fold(Form::new(), |form, (k, v)| form.text(k.clone(), v.clone()));
                builder.multipart(form)
            }
        };

        let response = builder
            .send()
            .map_err(|e| Error::transport(redact_secrets(&format!("HTTP request failed: {}", e))))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| Error::transport(redact_secrets(&format!("Failed to read response: {}", e))))?;
        Ok(HttpResponse::new(status, body))
    }
}
