//! Gemini 画像モデルによる画像生成

use crate::domain::{GeminiImageModel, ImageProvider, ImageResult};
use crate::error::Error;
use crate::image::provider::{ImageGenerator, NO_IMAGE_DATA};
use crate::llm::gemini::generate_content_url;
use crate::llm::provider::parse_json_body;
use crate::ports::outbound::{HttpClient, HttpRequest};
use serde_json::json;
use std::sync::Arc;

pub struct GeminiImageGenerator {
    http: Arc<dyn HttpClient>,
}

impl GeminiImageGenerator {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }
}

impl ImageGenerator for GeminiImageGenerator {
    fn provider(&self) -> ImageProvider {
        ImageProvider::Gemini
    }

    fn http(&self) -> &dyn HttpClient {
        self.http.as_ref()
    }

    fn fallback_error(&self) -> &'static str {
        "Gemini APIエラー"
    }

    fn make_request(&self, prompt: &str, api_key: &str, model: Option<&str>) -> Result<HttpRequest, Error> {
        let model = model.unwrap_or(GeminiImageModel::default().as_str());
        let mut generation_config = json!({ "responseModalities": ["TEXT", "IMAGE"] });
        if model == GeminiImageModel::Pro3Preview.as_str() {
            generation_config["imageConfig"] = json!({ "imageSize": "2K" });
        }
        let payload = json!({
            "contents": [ { "parts": [ { "text": prompt } ] } ],
            "generationConfig": generation_config
        });
        Ok(HttpRequest::json(generate_content_url(model, api_key)?, payload))
    }

    fn parse_response(&self, response_json: &str) -> Result<ImageResult, Error> {
        let v = parse_json_body(response_json)?;
        let inline = v["candidates"][0]["content"]["parts"]
            .as_array()
            .and_then(|parts| {
                parts
                    .iter()
                    .map(|p| &p["inlineData"])
                    .find(|d| d["data"].as_str().is_some_and(|s| !s.is_empty()))
            })
            .ok_or_else(|| Error::response_shape(NO_IMAGE_DATA))?;
        let mime = inline["mimeType"].as_str().unwrap_or("image/png");
        let data = inline["data"].as_str().unwrap_or_default();
        Ok(ImageResult::from_base64(mime, data, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::HttpResponse;

    struct Fixed(HttpResponse);

    impl HttpClient for Fixed {
        fn post(&self, _request: &HttpRequest) -> Result<HttpResponse, Error> {
            Ok(self.0.clone())
        }
    }

    fn generator(body: &str) -> GeminiImageGenerator {
        GeminiImageGenerator::new(Arc::new(Fixed(HttpResponse::new(200, body))))
    }

    #[test]
    fn test_default_model_has_no_image_config() {
        let req = generator("{}").make_request("styled", "AIzaK", None).unwrap();
        assert!(req.url.contains("/gemini-2.5-flash-image:generateContent?key=AIzaK"));
        let body = req.json_body().unwrap();
        assert_eq!(body["generationConfig"]["responseModalities"][1], "IMAGE");
        assert!(body["generationConfig"].get("imageConfig").is_none());
    }

    #[test]
    fn test_pro_preview_requests_2k() {
        let req = generator("{}").make_request("styled", "k", Some("gemini-3-pro-image-preview"))
            .unwrap();
        let body = req.json_body().unwrap();
        assert_eq!(body["generationConfig"]["imageConfig"]["imageSize"], "2K");
    }

    #[test]
    fn test_first_inline_data_part_wins() {
        let body = r#"{"candidates":[{"content":{"parts":[
            {"text":"Here is your image"},
            {"inlineData":{"mimeType":"image/jpeg","data":"/9j/4A"}},
            {"inlineData":{"mimeType":"image/png","data":"iVBOR"}}
        ]}}]}"#;
        let r = generator(body).generate("p", "k", None).unwrap();
        assert_eq!(r.image_url, "data:image/jpeg;base64,/9j/4A");
    }

    #[test]
    fn test_text_only_response_has_no_image_data() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"I cannot draw that"}]}}]}"#;
        let err = generator(body).generate("p", "k", None).unwrap_err();
        assert_eq!(err.to_string(), "画像データが見つかりませんでした");
    }
}
