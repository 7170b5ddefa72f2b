//! 画像生成プロバイダのトレイト定義

use crate::domain::{ImageProvider, ImageResult};
use crate::error::Error;
use crate::llm::prompt::error_message_from_body;
use crate::ports::outbound::{HttpClient, HttpRequest};

/// 画像が応答に含まれないときのメッセージ
pub const NO_IMAGE_DATA: &str = "画像データが見つかりませんでした";

/// 夢のイラストとしての画風を付けたプロンプト
pub fn styled_prompt(prompt: &str) -> String {
    format!(
        "Dreamy, ethereal illustration: {}. Style: soft watercolor, pastel colors, magical atmosphere, surreal and peaceful.",
        prompt
    )
}

/// 画像生成プロバイダのトレイト
///
/// `make_request` に渡るプロンプトは既に `styled_prompt` 済み。
pub trait ImageGenerator: Send + Sync {
    fn provider(&self) -> ImageProvider;

    fn http(&self) -> &dyn HttpClient;

    /// エラー本文からメッセージが取れなかったときの文言
    fn fallback_error(&self) -> &'static str;

    /// HTTP リクエストを組み立てる
    ///
    /// `model` はモデル選択子を持つプロバイダだけが使う。
    fn make_request(&self, prompt: &str, api_key: &str, model: Option<&str>) -> Result<HttpRequest, Error>;

    /// 成功レスポンスから画像を取り出す（無ければ `NO_IMAGE_DATA` の ResponseShape）
    fn parse_response(&self, response_json: &str) -> Result<ImageResult, Error>;

    /// 画像を 1 枚生成する
    fn generate(
        &self,
        prompt: &str,
        api_key: &str,
        model: Option<&str>,
    ) -> Result<ImageResult, Error> {
        let request = self.make_request(&styled_prompt(prompt), api_key, model)?;
        let response = self.http().post(&request)?;
        if !response.is_success() {
            return Err(Error::transport(error_message_from_body(
                response.status,
                &response.body,
                self.fallback_error(),
            )));
        }
        self.parse_response(&response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_styled_prompt() {
        assert_eq!(
            styled_prompt("a whale in the sky"),
            "Dreamy, ethereal illustration: a whale in the sky. Style: soft watercolor, pastel colors, magical atmosphere, surreal and peaceful."
        );
    }
}
