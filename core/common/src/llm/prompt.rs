//! 指示文と応答 JSON の取り出し

use crate::domain::InterpretationResult;
use crate::error::Error;
use serde_json::Value;

/// 回答形式の説明（全プロバイダ共通）
const RESPONSE_FORMAT: &str = r#"{
  "interpretation": "夢の解釈（2-3段落で詳しく説明。象徴的な意味、心理学的な観点、夢主へのメッセージを含める）",
  "keywords": ["キーワード1", "キーワード2", "キーワード3"],
  "imagePrompt": "この夢を表現するイラスト生成用の英語プロンプト（幻想的で美しい描写、50語以内）"
}"#;

/// system ロールを持つプロバイダ向けの指示
pub fn system_instruction() -> String {
    format!(
        "あなたは夢分析の専門家です。ユーザーの夢を分析し、以下のJSON形式で回答してください：\n{}\n夢の象徴的な意味、心理学的な観点、そして夢主へのメッセージを含めてください。JSON以外の文章は出力しないでください。",
        RESPONSE_FORMAT
    )
}

/// system 指示と組み合わせる user メッセージ
pub fn user_message(content: &str) -> String {
    format!("以下の夢を分析してください：\n\n{}", content)
}

/// 指示と夢の内容を 1 つにまとめたメッセージ（system ロールを使わないプロバイダ向け）
pub fn single_turn_prompt(content: &str) -> String {
    format!(
        "あなたは夢分析の専門家です。以下の夢を分析し、JSON形式で回答してください。\n\n夢の内容：\n{}\n\n以下のJSON形式で回答してください（他の文章は不要です）：\n{}",
        content, RESPONSE_FORMAT
    )
}

/// テキスト中で最初に釣り合う `{...}` の範囲を返す
///
/// 文字列リテラル内の波括弧とエスケープは数えない。最初の `{` が閉じない場合は
/// 次の `{` から探し直す。
pub fn extract_json_object(text: &str) -> Option<&str> {
    text.char_indices()
        .filter(|&(_, c)| c == '{')
        .find_map(|(start, _)| balanced_end(&text[start..]).map(|len| &text[start..start + len]))
}

/// `{` で始まる s の釣り合う `}` までのバイト長
fn balanced_end(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

/// モデルの応答テキストから解釈結果を取り出す
///
/// JSON が見つからない・壊れている・必須フィールドが欠けている場合は ResponseShape。
pub fn parse_interpretation(text: &str) -> Result<InterpretationResult, Error> {
    let span = extract_json_object(text)
        .ok_or_else(|| Error::response_shape("レスポンスからJSONを抽出できませんでした"))?;
    serde_json::from_str::<InterpretationResult>(span)
        .map_err(|e| Error::response_shape(format!("レスポンスのJSONが不正です: {}", e)))
}

/// エラーレスポンスの本文からメッセージを取り出す（無ければ fallback と HTTP ステータス）
pub fn error_message_from_body(status: u16, body: &str, fallback: &str) -> String {
    let from_body = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        v["error"]["message"]
            .as_str()
            .or_else(|| v["message"].as_str())
            .or_else(|| v["errors"][0].as_str())
            .or_else(|| v["error"].as_str())
            .map(|s| s.to_string())
    });
    match from_body {
        Some(msg) if !msg.trim().is_empty() => msg,
        _ => format!("{} (HTTP {})", fallback, status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bare_object() {
        assert_eq!(extract_json_object(r#"{"a":1}"#), Some(r#"{"a":1}"#));
    }

    #[test]
    fn test_extract_from_code_fence() {
        let text = "はい、分析しました。\n```json\n{\"a\": {\"b\": 2}}\n```\n以上です。{\"later\": true}";
        assert_eq!(extract_json_object(text), Some("{\"a\": {\"b\": 2}}"));
    }

    #[test]
    fn test_braces_inside_strings_are_ignored() {
        let text = r#"prefix {"interpretation": "波括弧 } や { を含む \"引用\"", "n": 1} suffix"#;
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"interpretation": "波括弧 } や { を含む \"引用\"", "n": 1}"#)
        );
    }

    #[test]
    fn test_unbalanced_first_brace_falls_back_to_next() {
        assert_eq!(extract_json_object("{ oops {\"x\":1}"), Some("{\"x\":1}"));
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("{ never closed"), None);
    }

    #[test]
    fn test_parse_interpretation_ok() {
        let text = "```json\n{\"interpretation\":\"変化の予兆\",\"keywords\":[\"海\",\"鳥\"],\"imagePrompt\":\"a bird over the sea\"}\n```";
        let r = parse_interpretation(text).unwrap();
        assert_eq!(r.interpretation, "変化の予兆");
        assert_eq!(r.keywords, vec!["海", "鳥"]);
        assert_eq!(r.image_prompt, "a bird over the sea");
    }

    #[test]
    fn test_parse_interpretation_rejects_partial_object() {
        let err = parse_interpretation(r#"{"interpretation":"途中まで","keywords":[]}"#).unwrap_err();
        assert!(matches!(err, Error::ResponseShape(_)));
    }

    #[test]
    fn test_parse_interpretation_without_json() {
        let err = parse_interpretation("申し訳ありませんが分析できません").unwrap_err();
        assert_eq!(err.to_string(), "レスポンスからJSONを抽出できませんでした");
    }

    #[test]
    fn test_error_message_from_body() {
        assert_eq!(
            error_message_from_body(401, r#"{"error":{"message":"Incorrect API key"}}"#, "OpenAI APIエラー"),
            "Incorrect API key"
        );
        assert_eq!(
            error_message_from_body(400, r#"{"message":"bad prompt"}"#, "x"),
            "bad prompt"
        );
        assert_eq!(
            error_message_from_body(500, "<html>oops</html>", "Claude APIエラー"),
            "Claude APIエラー (HTTP 500)"
        );
    }

    #[test]
    fn test_prompts_embed_content() {
        assert!(single_turn_prompt("空を飛ぶ夢").contains("空を飛ぶ夢"));
        assert!(user_message("猫").ends_with("猫"));
        assert!(system_instruction().contains("imagePrompt"));
    }
}
