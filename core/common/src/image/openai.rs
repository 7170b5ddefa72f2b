//! OpenAI DALL-E 3 による画像生成

use crate::domain::{ImageProvider, ImageResult};
use crate::error::Error;
use crate::image::provider::{ImageGenerator, NO_IMAGE_DATA};
use crate::llm::provider::parse_json_body;
use crate::ports::outbound::{HttpClient, HttpRequest};
use serde_json::json;
use std::sync::Arc;

const ENDPOINT: &str = "https://api.openai.com/v1/images/generations";

pub struct DalleImageGenerator {
    http: Arc<dyn HttpClient>,
}

impl DalleImageGenerator {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }
}

impl ImageGenerator for DalleImageGenerator {
    fn provider(&self) -> ImageProvider {
        ImageProvider::OpenAi
    }

    fn http(&self) -> &dyn HttpClient {
        self.http.as_ref()
    }

    fn fallback_error(&self) -> &'static str {
        "DALL-E APIエラー"
    }

    fn make_request(&self, prompt: &str, api_key: &str, _model: Option<&str>) -> Result<HttpRequest, Error> {
        let payload = json!({
            "model": "dall-e-3",
            "prompt": prompt,
            "n": 1,
            "size": "1024x1024",
            "quality": "standard",
            "response_format": "b64_json"
        });
        Ok(HttpRequest::json(ENDPOINT, payload).header("Authorization", format!("Bearer {}", api_key)))
    }

    fn parse_response(&self, response_json: &str) -> Result<ImageResult, Error> {
        let v = parse_json_body(response_json)?;
        let first = &v["data"][0];
        let data = first["b64_json"]
            .as_str()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::response_shape(NO_IMAGE_DATA))?;
        let revised = first["revised_prompt"].as_str().map(|s| s.to_string());
        Ok(ImageResult::from_base64("image/png", data, revised))
    }
}
