//! Google Gemini（generateContent）による夢解釈

use crate::domain::TextProvider;
use crate::error::Error;
use crate::llm::prompt::single_turn_prompt;
use crate::llm::provider::{parse_json_body, TextInterpreter};
use crate::ports::outbound::{HttpClient, HttpRequest};
use reqwest::Url;
use serde_json::json;
use std::sync::Arc;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// generateContent の URL（API キーはクエリパラメータ）
///
/// モデル名はパスの 1 セグメント、キーはクエリ値としてエスケープする。
pub(crate) fn generate_content_url(model: &str, api_key: &str) -> Result<String, Error> {
    let mut url = Url::parse(BASE_URL)
        .map_err(|e| Error::configuration(format!("GeminiのURLが不正です: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| Error::configuration("GeminiのURLが不正です"))?
        .push(&format!("{}:generateContent", model));
    url.query_pairs_mut().append_pair("key", api_key);
    Ok(url.to_string())
}

/// Gemini プロバイダ
pub struct GeminiInterpreter {
    http: Arc<dyn HttpClient>,
}

impl GeminiInterpreter {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }
}

impl TextInterpreter for GeminiInterpreter {
    fn provider(&self) -> TextProvider {
        TextProvider::Gemini
    }

    fn http(&self) -> &dyn HttpClient {
        self.http.as_ref()
    }

    fn fallback_error(&self) -> &'static str {
        "Gemini APIエラー"
    }

    fn make_request(&self, content: &str, api_key: &str, model: &str) -> Result<HttpRequest, Error> {
        let payload = json!({
            "contents": [
                { "parts": [ { "text": single_turn_prompt(content) } ] }
            ],
            "generationConfig": {
                "temperature": 0.7,
                "topK": 40,
                "topP": 0.95,
                "maxOutputTokens": 1024
            }
        });
        Ok(HttpRequest::json(generate_content_url(model, api_key)?, payload))
    }

    fn parse_response_text(&self, response_json: &str) -> Result<Option<String>, Error> {
        let v = parse_json_body(response_json)?;
        if let Some(reason) = v["promptFeedback"]["blockReason"].as_str() {
            return Err(Error::response_shape(format!(
                "Geminiが応答をブロックしました: {}",
                reason
            )));
        }
        let text: String = v["candidates"][0]["content"]["parts"]
            .as_array()
            .map(|parts| parts.iter().filter_map(|p| p["text"].as_str()).collect())
            .unwrap_or_default();
        Ok(Some(text).filter(|s| !s.trim().is_empty()))
    }
}
