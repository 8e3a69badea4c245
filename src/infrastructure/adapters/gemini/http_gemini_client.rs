//! HTTP Gemini Client - 调用 Google 生成式 AI REST API
//!
//! 实现 GenerationGatewayPort trait，三种能力走同一个
//! generateContent 端点，按模型与 generationConfig 区分:
//!
//! POST {base}/v1beta/models/{model}:generateContent
//! Header: x-goog-api-key
//! Response: candidates[0].content.parts[]，文本在 text，
//! 图像/音频在 inlineData（base64），检索引用在 groundingMetadata

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{
    ContentPart, GatewayError, GenerationGatewayPort, ImageRequest, SpeechReply, SpeechRequest,
    StructuredReply, StructuredRequest,
};

/// 图像生成统一质量前缀
pub const IMAGE_QUALITY_PREFIX: &str = "High quality cinematic photo. ";

/// Gemini 客户端配置
#[derive(Debug, Clone)]
pub struct GeminiClientConfig {
    /// API 基础 URL
    pub base_url: String,
    /// API key
    pub api_key: String,
    /// 结构化文本生成模型
    pub text_model: String,
    /// 图像生成模型
    pub image_model: String,
    /// 语音合成模型
    pub tts_model: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    /// 传输层错误的额外重试次数（0 = 单次请求）
    pub max_retries: u32,
    /// 响应 MIME 未携带采样率时的回退值
    pub default_sample_rate: u32,
}

impl Default for GeminiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key: String::new(),
            text_model: "gemini-3-pro-preview".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            tts_model: "gemini-2.5-flash-preview-tts".to_string(),
            timeout_secs: 120,
            max_retries: 0,
            default_sample_rate: 24000,
        }
    }
}

// ---------- 请求 wire DTO ----------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireContent {
    parts: Vec<WirePart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<WireInlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "googleSearch")]
    google_search: serde_json::Value,
}

// ---------- 响应 wire DTO ----------

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<WireContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    uri: Option<String>,
}

/// 去掉模型偶尔包裹 JSON 的 markdown 代码栅栏
fn strip_markdown_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// 从音频 MIME 中解析采样率（如 "audio/L16;codec=pcm;rate=24000"）
fn parse_sample_rate(mime_type: &str) -> Option<u32> {
    mime_type
        .split(';')
        .map(str::trim)
        .find_map(|param| param.strip_prefix("rate="))
        .and_then(|rate| rate.parse().ok())
}

fn encode_parts(parts: &[ContentPart]) -> Vec<WirePart> {
    parts
        .iter()
        .map(|part| match part {
            ContentPart::Text(text) => WirePart {
                text: Some(text.clone()),
                inline_data: None,
            },
            ContentPart::Image(image) => WirePart {
                text: None,
                inline_data: Some(WireInlineData {
                    mime_type: image.mime_type.clone(),
                    data: general_purpose::STANDARD.encode(&image.data),
                }),
            },
        })
        .collect()
}

/// HTTP Gemini 客户端
pub struct HttpGeminiClient {
    client: Client,
    config: GeminiClientConfig,
}

impl HttpGeminiClient {
    /// 创建新的 Gemini 客户端
    pub fn new(config: GeminiClientConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn model_url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, model
        )
    }

    async fn post(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GatewayError> {
        let mut attempt: u32 = 0;
        loop {
            match self.post_once(model, body).await {
                Err(e @ (GatewayError::Transport(_) | GatewayError::Timeout))
                    if attempt < self.config.max_retries =>
                {
                    attempt += 1;
                    tracing::warn!(
                        model = %model,
                        attempt = attempt,
                        max_retries = self.config.max_retries,
                        error = %e,
                        "Transport error, retrying"
                    );
                }
                other => return other,
            }
        }
    }

    async fn post_once(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GatewayError> {
        let url = self.model_url(model);
        tracing::debug!(url = %url, "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout
                } else if e.is_connect() {
                    GatewayError::Transport(format!("Cannot connect to generation service: {}", e))
                } else {
                    GatewayError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GatewayError::Service(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| GatewayError::Service(format!("Malformed response body: {}", e)))
    }

    fn first_content(response: GenerateContentResponse) -> Option<(WireContent, Vec<String>)> {
        let candidate = response.candidates.into_iter().next()?;
        let citations = candidate
            .grounding_metadata
            .map(|meta| {
                meta.grounding_chunks
                    .into_iter()
                    .filter_map(|chunk| chunk.web.and_then(|web| web.uri))
                    .collect()
            })
            .unwrap_or_default();
        candidate.content.map(|content| (content, citations))
    }
}

#[async_trait]
impl GenerationGatewayPort for HttpGeminiClient {
    async fn generate_structured(
        &self,
        request: StructuredRequest,
    ) -> Result<StructuredReply, GatewayError> {
        let body = GenerateContentRequest {
            contents: vec![WireContent {
                parts: encode_parts(&request.parts),
            }],
            system_instruction: request.system_instruction.map(|text| WireContent {
                parts: vec![WirePart {
                    text: Some(text),
                    inline_data: None,
                }],
            }),
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(request.response_schema),
                ..Default::default()
            }),
            tools: request.grounded.then(|| {
                vec![WireTool {
                    google_search: serde_json::json!({}),
                }]
            }),
        };

        let response = self.post(&self.config.text_model, &body).await?;
        let (content, citations) =
            Self::first_content(response).ok_or(GatewayError::EmptyResponse)?;

        let text = content
            .parts
            .into_iter()
            .find_map(|part| part.text)
            .ok_or(GatewayError::EmptyResponse)?;

        let json: serde_json::Value = serde_json::from_str(strip_markdown_fences(&text))
            .map_err(|e| GatewayError::SchemaViolation(e.to_string()))?;

        tracing::info!(
            model = %self.config.text_model,
            citations = citations.len(),
            "Structured generation completed"
        );

        Ok(StructuredReply { json, citations })
    }

    async fn generate_image(&self, request: ImageRequest) -> Result<Vec<u8>, GatewayError> {
        let mut parts = vec![ContentPart::Text(format!(
            "{}{}",
            IMAGE_QUALITY_PREFIX, request.prompt
        ))];
        if let Some(reference) = request.reference_image {
            parts.push(ContentPart::Image(reference));
        }

        let body = GenerateContentRequest {
            contents: vec![WireContent {
                parts: encode_parts(&parts),
            }],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["IMAGE".to_string()]),
                image_config: Some(ImageConfig {
                    aspect_ratio: request.aspect_ratio.as_str().to_string(),
                }),
                ..Default::default()
            }),
            tools: None,
        };

        let response = self.post(&self.config.image_model, &body).await?;
        let (content, _) = Self::first_content(response).ok_or(GatewayError::NoImageReturned)?;

        let inline = content
            .parts
            .into_iter()
            .find_map(|part| part.inline_data)
            .ok_or(GatewayError::NoImageReturned)?;

        let bytes = general_purpose::STANDARD
            .decode(inline.data.as_bytes())
            .map_err(|e| GatewayError::Service(format!("Invalid base64 image data: {}", e)))?;

        tracing::info!(
            model = %self.config.image_model,
            aspect_ratio = %request.aspect_ratio,
            image_size = bytes.len(),
            "Image generation completed"
        );

        Ok(bytes)
    }

    async fn synthesize_speech(
        &self,
        request: SpeechRequest,
    ) -> Result<SpeechReply, GatewayError> {
        let body = GenerateContentRequest {
            contents: vec![WireContent {
                parts: vec![WirePart {
                    text: Some(request.text),
                    inline_data: None,
                }],
            }],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: request.voice.clone(),
                        },
                    },
                }),
                ..Default::default()
            }),
            tools: None,
        };

        let response = self.post(&self.config.tts_model, &body).await?;
        let (content, _) = Self::first_content(response).ok_or(GatewayError::NoAudioReturned)?;

        let inline = content
            .parts
            .into_iter()
            .find_map(|part| part.inline_data)
            .ok_or(GatewayError::NoAudioReturned)?;

        let sample_rate =
            parse_sample_rate(&inline.mime_type).unwrap_or(self.config.default_sample_rate);
        let pcm = general_purpose::STANDARD
            .decode(inline.data.as_bytes())
            .map_err(|e| GatewayError::Service(format!("Invalid base64 audio data: {}", e)))?;

        tracing::info!(
            model = %self.config.tts_model,
            voice = %request.voice,
            sample_rate = sample_rate,
            pcm_size = pcm.len(),
            "Speech synthesis completed"
        );

        Ok(SpeechReply { pcm, sample_rate })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = GeminiClientConfig::default();
        assert_eq!(config.base_url, "https://generativelanguage.googleapis.com");
        assert_eq!(config.text_model, "gemini-3-pro-preview");
        assert_eq!(config.image_model, "gemini-2.5-flash-image");
        assert_eq!(config.tts_model, "gemini-2.5-flash-preview-tts");
        assert_eq!(config.default_sample_rate, 24000);
        assert_eq!(config.max_retries, 0);
    }

    #[test]
    fn test_strip_markdown_fences() {
        assert_eq!(strip_markdown_fences("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_markdown_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_markdown_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_markdown_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn test_parse_sample_rate() {
        assert_eq!(parse_sample_rate("audio/L16;codec=pcm;rate=24000"), Some(24000));
        assert_eq!(parse_sample_rate("audio/L16; rate=16000"), Some(16000));
        assert_eq!(parse_sample_rate("audio/L16;codec=pcm"), None);
        assert_eq!(parse_sample_rate("audio/L16;rate=abc"), None);
    }

    #[test]
    fn test_request_serializes_provider_field_names() {
        let body = GenerateContentRequest {
            contents: vec![WireContent {
                parts: vec![WirePart {
                    text: Some("hi".to_string()),
                    inline_data: Some(WireInlineData {
                        mime_type: "image/png".to_string(),
                        data: "AAAA".to_string(),
                    }),
                }],
            }],
            system_instruction: Some(WireContent {
                parts: vec![WirePart {
                    text: Some("sys".to_string()),
                    inline_data: None,
                }],
            }),
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(serde_json::json!({"type": "OBJECT"})),
                ..Default::default()
            }),
            tools: Some(vec![WireTool {
                google_search: serde_json::json!({}),
            }]),
        };

        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("systemInstruction").is_some());
        assert!(json["generationConfig"].get("responseMimeType").is_some());
        assert!(json["generationConfig"].get("responseSchema").is_some());
        assert!(json["contents"][0]["parts"][0].get("inlineData").is_some());
        assert_eq!(json["contents"][0]["parts"][0]["inlineData"]["mimeType"], "image/png");
        assert!(json["tools"][0].get("googleSearch").is_some());
    }

    #[test]
    fn test_grounding_citations_extracted() {
        let raw = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{}" }] },
                "groundingMetadata": {
                    "groundingChunks": [
                        { "web": { "uri": "https://detik.com/a" } },
                        { "web": {} },
                        { "web": { "uri": "https://kompas.com/b" } }
                    ]
                }
            }]
        });
        let response: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        let (_, citations) = HttpGeminiClient::first_content(response).unwrap();
        assert_eq!(citations, vec!["https://detik.com/a", "https://kompas.com/b"]);
    }

    #[test]
    fn test_speech_request_serializes_voice_config() {
        let config = GenerationConfig {
            response_modalities: Some(vec!["AUDIO".to_string()]),
            speech_config: Some(SpeechConfig {
                voice_config: VoiceConfig {
                    prebuilt_voice_config: PrebuiltVoiceConfig {
                        voice_name: "Kore".to_string(),
                    },
                },
            }),
            ..Default::default()
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(
            json["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
            "Kore"
        );
        assert_eq!(json["responseModalities"][0], "AUDIO");
    }
}
