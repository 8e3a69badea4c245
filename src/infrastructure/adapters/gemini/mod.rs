//! Gemini Adapters - 生成端适配器实现

pub mod fake_gemini_client;
pub mod http_gemini_client;

pub use fake_gemini_client::FakeGeminiClient;
pub use http_gemini_client::{GeminiClientConfig, HttpGeminiClient, IMAGE_QUALITY_PREFIX};
