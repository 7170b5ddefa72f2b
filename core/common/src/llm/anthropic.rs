//! Anthropic Messages API（Claude）による夢解釈

use crate::domain::TextProvider;
use crate::error::Error;
use crate::llm::prompt::single_turn_prompt;
use crate::llm::provider::{parse_json_body, TextInterpreter};
use crate::ports::outbound::{HttpClient, HttpRequest};
use serde_json::json;
use std::sync::Arc;

const ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

/// Claude プロバイダ
pub struct AnthropicInterpreter {
    http: Arc<dyn HttpClient>,
}

impl AnthropicInterpreter {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }
}

impl TextInterpreter for AnthropicInterpreter {
    fn provider(&self) -> TextProvider {
        TextProvider::Anthropic
    }

    fn http(&self) -> &dyn HttpClient {
        self.http.as_ref()
    }

    fn fallback_error(&self) -> &'static str {
        "Claude APIエラー"
    }

    fn make_request(&self, content: &str, api_key: &str, model: &str) -> Result<HttpRequest, Error> {
        let payload = json!({
            "model": model,
            "max_tokens": MAX_TOKENS,
            "messages": [
                { "role": "user", "content": single_turn_prompt(content) }
            ]
        });
        Ok(HttpRequest::json(ENDPOINT, payload)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION))
    }

    fn parse_response_text(&self, response_json: &str) -> Result<Option<String>, Error> {
        let v = parse_json_body(response_json)?;
        let text = v["content"].as_array().and_then(|blocks| {
            blocks
                .iter()
                .filter(|b| b["type"] == "text")
                .find_map(|b| b["text"].as_str())
        });
        Ok(text.filter(|s| !s.trim().is_empty()).map(|s| s.to_string()))
    }
}
