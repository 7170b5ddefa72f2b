//! 画像生成プロバイダの実装
//!
//! どのプロバイダにも同じ画風の修飾を付けたプロンプトを渡し、結果は data URI で返す。

pub mod gemini;
pub mod openai;
pub mod provider;
pub mod stability;

pub use gemini::GeminiImageGenerator;
pub use openai::DalleImageGenerator;
pub use provider::{styled_prompt, ImageGenerator};
pub use stability::StabilityImageGenerator;
