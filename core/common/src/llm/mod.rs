//! 夢解釈（テキスト AI）プロバイダの実装
//!
//! 各プロバイダは共通の指示文で JSON（interpretation / keywords / imagePrompt）を要求し、
//! 応答テキストから最初の釣り合った `{...}` を取り出して InterpretationResult にする。

pub mod anthropic;
pub mod gemini;
pub mod openai;
pub mod prompt;
pub mod provider;

pub use anthropic::AnthropicInterpreter;
pub use gemini::GeminiInterpreter;
pub use openai::OpenAiInterpreter;
pub use provider::TextInterpreter;
