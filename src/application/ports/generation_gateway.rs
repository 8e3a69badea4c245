//! Generation Gateway Port - 生成端抽象
//!
//! 围绕生成式 AI 供应商的类型化薄接口，三种能力:
//! - 结构化 JSON 生成（可选 web 检索溯源）
//! - 图像生成（可选参考图）
//! - 语音合成（原始 PCM）
//!
//! 所有调用均为单次请求/响应；重试策略属于适配器配置

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 生成端错误
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    Service(String),

    /// 响应中没有文本部分
    #[error("Empty response: no text part returned")]
    EmptyResponse,

    /// 文本无法按 JSON schema 解析
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    /// 响应中没有图像部分
    #[error("No image part returned")]
    NoImageReturned,

    /// 响应中没有音频部分
    #[error("No audio part returned")]
    NoAudioReturned,
}

/// 内联图片（已解码的原始字节 + MIME 类型）
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl InlineImage {
    pub fn png(data: Vec<u8>) -> Self {
        Self {
            mime_type: "image/png".to_string(),
            data,
        }
    }
}

/// 多模态内容部分（按序发送）
#[derive(Debug, Clone)]
pub enum ContentPart {
    Text(String),
    Image(InlineImage),
}

/// 图像宽高比
///
/// 供应商支持的固定集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "3:4")]
    PortraitThreeFour,
    #[serde(rename = "4:3")]
    LandscapeFourThree,
    #[serde(rename = "9:16")]
    Vertical,
    #[serde(rename = "16:9")]
    Wide,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::PortraitThreeFour => "3:4",
            AspectRatio::LandscapeFourThree => "4:3",
            AspectRatio::Vertical => "9:16",
            AspectRatio::Wide => "16:9",
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 结构化生成请求
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    /// 按序内容部分（文本 / 内联参考图）
    pub parts: Vec<ContentPart>,
    /// 系统指令
    pub system_instruction: Option<String>,
    /// 响应 JSON schema
    pub response_schema: serde_json::Value,
    /// 是否启用 web 检索溯源
    pub grounded: bool,
}

/// 结构化生成响应
///
/// 仅保证语法合法（可解析 JSON）；语义校验（N+1 等）由管线负责
#[derive(Debug, Clone)]
pub struct StructuredReply {
    pub json: serde_json::Value,
    /// 溯源引用 URI 列表；未启用或无结果时为空
    pub citations: Vec<String>,
}

/// 图像生成请求
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
    /// 风格锚定参考图
    pub reference_image: Option<InlineImage>,
}

/// 语音合成请求
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    pub text: String,
    /// 供应商预置音色名
    pub voice: String,
}

/// 语音合成响应
#[derive(Debug, Clone)]
pub struct SpeechReply {
    /// 原始小端 16 位单声道 PCM
    pub pcm: Vec<u8>,
    pub sample_rate: u32,
}

/// Generation Gateway Port
///
/// 生成式 AI 供应商的抽象接口，具体实现在 infrastructure/adapters 层
#[async_trait]
pub trait GenerationGatewayPort: Send + Sync {
    /// 请求结构化 JSON 输出
    async fn generate_structured(
        &self,
        request: StructuredRequest,
    ) -> Result<StructuredReply, GatewayError>;

    /// 生成一张图片，返回编码后的图像字节
    async fn generate_image(&self, request: ImageRequest) -> Result<Vec<u8>, GatewayError>;

    /// 合成语音，返回原始 PCM
    async fn synthesize_speech(&self, request: SpeechRequest)
        -> Result<SpeechReply, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_strings() {
        assert_eq!(AspectRatio::Square.as_str(), "1:1");
        assert_eq!(AspectRatio::PortraitThreeFour.as_str(), "3:4");
        assert_eq!(AspectRatio::LandscapeFourThree.as_str(), "4:3");
        assert_eq!(AspectRatio::Vertical.as_str(), "9:16");
        assert_eq!(AspectRatio::Wide.as_str(), "16:9");
    }

    #[test]
    fn test_aspect_ratio_serde() {
        let ratio: AspectRatio = serde_json::from_str("\"9:16\"").unwrap();
        assert_eq!(ratio, AspectRatio::Vertical);
        assert_eq!(serde_json::to_string(&AspectRatio::Wide).unwrap(), "\"16:9\"");
    }
}
