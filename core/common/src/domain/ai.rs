//! AI 呼び出しの結果（永続化はせず、エントリへ反映して使う）

use serde::{Deserialize, Serialize};

/// 夢解釈の結果
///
/// 3 フィールドとも必須。どれかが欠けた応答は部分的に受け入れず、応答形式エラーにする。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterpretationResult {
    pub interpretation: String,
    pub keywords: Vec<String>,
    /// 英語の画像生成プロンプト
    pub image_prompt: String,
}

/// 画像生成の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResult {
    /// data URI（base64 埋め込み）または外部 URL
    pub image_url: String,
    /// プロバイダが書き換えたプロンプト（返す場合のみ）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,
}

impl ImageResult {
    /// base64 の画像データから data URI を組み立てる
    pub fn from_base64(mime_type: &str, data: &str, revised_prompt: Option<String>) -> Self {
        Self {
            image_url: format!("data:{};base64,{}", mime_type, data),
            revised_prompt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpretation_requires_all_fields() {
        let ok: Result<InterpretationResult, _> = serde_json::from_str(
            r#"{"interpretation":"i","keywords":["k"],"imagePrompt":"p"}"#,
        );
        assert!(ok.is_ok());
        let missing: Result<InterpretationResult, _> =
            serde_json::from_str(r#"{"interpretation":"i","keywords":["k"]}"#);
        assert!(missing.is_err());
    }

    #[test]
    fn test_image_result_from_base64() {
        let r = ImageResult::from_base64("image/png", "QUJD", None);
        assert_eq!(r.image_url, "data:image/png;base64,QUJD");
    }
}
