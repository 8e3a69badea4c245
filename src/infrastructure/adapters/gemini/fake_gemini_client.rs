//! Fake Gemini Client - 用于测试与离线联调的生成端
//!
//! 不访问网络。默认返回确定性的占位产物；测试可以预先入队脚本化
//! 响应（含错误）来驱动管线的失败路径。

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::application::ports::{
    GatewayError, GenerationGatewayPort, ImageRequest, SpeechReply, SpeechRequest,
    StructuredReply, StructuredRequest,
};

/// Fake Gemini Client
pub struct FakeGeminiClient {
    structured_replies: Mutex<VecDeque<Result<StructuredReply, GatewayError>>>,
    image_replies: Mutex<VecDeque<Result<Vec<u8>, GatewayError>>>,
    speech_replies: Mutex<VecDeque<Result<SpeechReply, GatewayError>>>,
    /// 语音合成被调用的次数（缓存命中断言用）
    speech_calls: AtomicUsize,
    default_sample_rate: u32,
}

impl FakeGeminiClient {
    pub fn new(default_sample_rate: u32) -> Self {
        Self {
            structured_replies: Mutex::new(VecDeque::new()),
            image_replies: Mutex::new(VecDeque::new()),
            speech_replies: Mutex::new(VecDeque::new()),
            speech_calls: AtomicUsize::new(0),
            default_sample_rate,
        }
    }

    /// 入队一条结构化生成响应
    pub fn push_structured(&self, reply: Result<StructuredReply, GatewayError>) {
        if let Ok(mut queue) = self.structured_replies.lock() {
            queue.push_back(reply);
        }
    }

    /// 入队一条图像生成响应
    pub fn push_image(&self, reply: Result<Vec<u8>, GatewayError>) {
        if let Ok(mut queue) = self.image_replies.lock() {
            queue.push_back(reply);
        }
    }

    /// 入队一条语音合成响应
    pub fn push_speech(&self, reply: Result<SpeechReply, GatewayError>) {
        if let Ok(mut queue) = self.speech_replies.lock() {
            queue.push_back(reply);
        }
    }

    pub fn speech_call_count(&self) -> usize {
        self.speech_calls.load(Ordering::SeqCst)
    }
}

impl Default for FakeGeminiClient {
    fn default() -> Self {
        Self::new(24000)
    }
}

#[async_trait]
impl GenerationGatewayPort for FakeGeminiClient {
    async fn generate_structured(
        &self,
        request: StructuredRequest,
    ) -> Result<StructuredReply, GatewayError> {
        tracing::debug!(
            parts = request.parts.len(),
            grounded = request.grounded,
            "FakeGeminiClient: structured generation"
        );

        if let Ok(mut queue) = self.structured_replies.lock() {
            if let Some(reply) = queue.pop_front() {
                return reply;
            }
        }

        Ok(StructuredReply {
            json: serde_json::json!({}),
            citations: Vec::new(),
        })
    }

    async fn generate_image(&self, request: ImageRequest) -> Result<Vec<u8>, GatewayError> {
        tracing::debug!(
            prompt_len = request.prompt.len(),
            aspect_ratio = %request.aspect_ratio,
            has_reference = request.reference_image.is_some(),
            "FakeGeminiClient: image generation"
        );

        if let Ok(mut queue) = self.image_replies.lock() {
            if let Some(reply) = queue.pop_front() {
                return reply;
            }
        }

        // PNG magic + 占位字节，足以被当成不透明图像产物
        Ok(vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A])
    }

    async fn synthesize_speech(
        &self,
        request: SpeechRequest,
    ) -> Result<SpeechReply, GatewayError> {
        self.speech_calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            text_len = request.text.len(),
            voice = %request.voice,
            "FakeGeminiClient: speech synthesis"
        );

        if let Ok(mut queue) = self.speech_replies.lock() {
            if let Some(reply) = queue.pop_front() {
                return reply;
            }
        }

        // 0.1 秒静音（16 位单声道）
        let samples = self.default_sample_rate as usize / 10;
        Ok(SpeechReply {
            pcm: vec![0u8; samples * 2],
            sample_rate: self.default_sample_rate,
        })
    }
}
