//! HTTP クライアント Outbound ポート
//!
//! プロバイダアダプタはリクエストの組み立てと応答の解釈だけを持ち、送受信はこの trait に任せる。
//! 1 リクエスト 1 レスポンス。リトライ・ストリーミング・独自タイムアウトは持たない。

use crate::error::Error;
use serde_json::Value;

/// リクエストボディ
#[derive(Debug, Clone, PartialEq)]
pub enum HttpBody {
    /// application/json
    Json(Value),
    /// multipart/form-data のテキストフィールド（順序を保つ）
    Multipart(Vec<(String, String)>),
}

/// POST リクエスト
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: HttpBody,
}

impl HttpRequest {
    pub fn json(url: impl Into<String>, body: Value) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            body: HttpBody::Json(body),
        }
    }

    pub fn multipart(url: impl Into<String>, fields: Vec<(String, String)>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            body: HttpBody::Multipart(fields),
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// ヘッダ値（名前は大文字小文字を無視）
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// JSON ボディ（multipart なら None）
    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            HttpBody::Json(v) => Some(v),
            HttpBody::Multipart(_) => None,
        }
    }
}

/// レスポンス（ステータスと本文）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP 送信の抽象（Outbound ポート）
///
/// 非 2xx でも Ok(HttpResponse) を返す。Err は接続できなかった等の通信自体の失敗のみ。
pub trait HttpClient: Send + Sync {
    fn post(&self, request: &HttpRequest) -> Result<HttpResponse, Error>;
}
