//! 夢解釈プロバイダのトレイト定義

use crate::domain::{InterpretationResult, TextProvider};
use crate::error::Error;
use crate::llm::prompt::{error_message_from_body, parse_interpretation};
use crate::ports::outbound::{HttpClient, HttpRequest};

/// 夢解釈プロバイダのトレイト
///
/// 各プロバイダ（OpenAI、Claude、Gemini）はリクエストの組み立てと応答テキストの抽出だけを実装する。
/// 送信・エラー本文の解釈・JSON の取り出しは `interpret` のデフォルト実装が受け持つ。
pub trait TextInterpreter: Send + Sync {
    /// どのプロバイダか
    fn provider(&self) -> TextProvider;

    /// 送受信に使うクライアント
    fn http(&self) -> &dyn HttpClient;

    /// 非 2xx でエラー本文からメッセージが取れなかったときの文言
    fn fallback_error(&self) -> &'static str;

    /// HTTP リクエストを組み立てる
    ///
    /// # Arguments
    /// * `content` - 夢の本文
    /// * `api_key` - 空でないことは呼び出し側が保証する
    /// * `model` - モデル ID
    fn make_request(&self, content: &str, api_key: &str, model: &str) -> Result<HttpRequest, Error>;

    /// 成功レスポンスからモデルの出力テキストを抽出
    ///
    /// # Returns
    /// * `Ok(None)` - 本文は JSON だがテキストが無い
    /// * `Err(Error)` - 本文が JSON ではない
    fn parse_response_text(&self, response_json: &str) -> Result<Option<String>, Error>;

    /// 夢を解釈する（1 リクエスト、リトライなし）
    fn interpret(
        &self,
        content: &str,
        api_key: &str,
        model: &str,
    ) -> Result<InterpretationResult, Error> {
        let request = self.make_request(content, api_key, model)?;
        let response = self.http().post(&request)?;
        if !response.is_success() {
            return Err(Error::transport(error_message_from_body(
                response.status,
                &response.body,
                self.fallback_error(),
            )));
        }
        let text = self.parse_response_text(&response.body)?.ok_or_else(|| {
            Error::response_shape(format!("{}からの応答が空です", self.provider().label()))
        })?;
        parse_interpretation(&text)
    }
}

/// レスポンス本文を JSON として読む（共通ヘルパ）
pub(crate) fn parse_json_body(body: &str) -> Result<serde_json::Value, Error> {
    serde_json::from_str(body)
        .map_err(|e| Error::response_shape(format!("レスポンスがJSONではありません: {}", e)))
}
