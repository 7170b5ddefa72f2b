//! OpenAI Chat Completions による夢解釈

use crate::domain::TextProvider;
use crate::error::Error;
use crate::llm::prompt::{system_instruction, user_message};
use crate::llm::provider::{parse_json_body, TextInterpreter};
use crate::ports::outbound::{HttpClient, HttpRequest};
use serde_json::json;
use std::sync::Arc;

const ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI プロバイダ
pub struct OpenAiInterpreter {
    http: Arc<dyn HttpClient>,
}

impl OpenAiInterpreter {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }
}

impl TextInterpreter for OpenAiInterpreter {
    fn provider(&self) -> TextProvider {
        TextProvider::OpenAi
    }

    fn http(&self) -> &dyn HttpClient {
        self.http.as_ref()
    }

    fn fallback_error(&self) -> &'static str {
        "OpenAI APIエラー"
    }

    fn make_request(&self, content: &str, api_key: &str, model: &str) -> Result<HttpRequest, Error> {
        let payload = json!({
            "model": model,
            "messages": [
                { "role": "system", "content": system_instruction() },
                { "role": "user", "content": user_message(content) }
            ],
            "temperature": 0.7,
            "response_format": { "type": "json_object" }
        });
        Ok(HttpRequest::json(ENDPOINT, payload).header("Authorization", format!("Bearer {}", api_key)))
    }

    fn parse_response_text(&self, response_json: &str) -> Result<Option<String>, Error> {
        let v = parse_json_body(response_json)?;
        Ok(v["choices"][0]["message"]["content"]
            .as_str()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.to_string()))
    }
}
