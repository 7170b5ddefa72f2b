//! Stability AI（Stable Image Core）による画像生成

use crate::domain::{ImageProvider, ImageResult};
use crate::error::Error;
use crate::image::provider::{ImageGenerator, NO_IMAGE_DATA};
use crate::llm::provider::parse_json_body;
use crate::ports::outbound::{HttpClient, HttpRequest};
use std::sync::Arc;

const ENDPOINT: &str = "https://api.stability.ai/v2beta/stable-image/generate/core";

pub struct StabilityImageGenerator {
    http: Arc<dyn HttpClient>,
}

impl StabilityImageGenerator {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }
}

impl ImageGenerator for StabilityImageGenerator {
    fn provider(&self) -> ImageProvider {
        ImageProvider::Stability
    }

    fn http(&self) -> &dyn HttpClient {
        self.http.as_ref()
    }

    fn fallback_error(&self) -> &'static str {
        "Stability AI APIエラー"
    }

    fn make_request(&self, prompt: &str, api_key: &str, _model: Option<&str>) -> Result<HttpRequest, Error> {
        let fields = vec![
            ("prompt".to_string(), prompt.to_string()),
            ("output_format".to_string(), "png".to_string()),
            ("aspect_ratio".to_string(), "1:1".to_string()),
        ];
        Ok(HttpRequest::multipart(ENDPOINT, fields)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Accept", "application/json"))
    }

    fn parse_response(&self, response_json: &str) -> Result<ImageResult, Error> {
        let v = parse_json_body(response_json)?;
        let data = v["image"]
            .as_str()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::response_shape(NO_IMAGE_DATA))?;
        Ok(ImageResult::from_base64("image/png", data, None))
    }
}
