//! Data Transfer Objects

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

use crate::application::ports::InlineImage;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(Empty {}),
        }
    }
}

// ============================================================================
// 参考图上传
// ============================================================================

/// JSON 体里的参考图（data-URL 或裸 base64）
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceImageDto {
    /// `data:image/png;base64,....` 或仅 base64 负载
    pub data: String,
    /// data 为裸 base64 时的 MIME 类型
    #[serde(default)]
    pub mime_type: Option<String>,
}

impl ReferenceImageDto {
    /// 解码为内联图片
    ///
    /// data-URL 前缀里的 MIME 优先于显式字段
    pub fn decode(&self) -> Result<InlineImage, String> {
        let (mime_type, payload) = match self.data.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest
                    .split_once(',')
                    .ok_or_else(|| "Malformed data URL: missing comma".to_string())?;
                let mime = header
                    .strip_suffix(";base64")
                    .ok_or_else(|| "Malformed data URL: not base64 encoded".to_string())?;
                (mime.to_string(), payload)
            }
            None => (
                self.mime_type
                    .clone()
                    .unwrap_or_else(|| "image/png".to_string()),
                self.data.as_str(),
            ),
        };

        let data = general_purpose::STANDARD
            .decode(payload.as_bytes())
            .map_err(|e| format!("Invalid base64 image payload: {}", e))?;

        Ok(InlineImage { mime_type, data })
    }
}

// ============================================================================
// 批处理汇总
// ============================================================================

/// 批处理失败条目
#[derive(Debug, Serialize)]
pub struct BatchFailureDto {
    pub key: String,
    pub error: String,
}

/// 批处理汇总
#[derive(Debug, Serialize)]
pub struct BatchSummaryDto {
    pub generated: Vec<String>,
    pub failed: Vec<BatchFailureDto>,
    pub total: usize,
}

impl BatchSummaryDto {
    pub fn new(generated: Vec<String>, failures: &[crate::application::batch::BatchFailure]) -> Self {
        let failed: Vec<BatchFailureDto> = failures
            .iter()
            .map(|f| BatchFailureDto {
                key: f.label.clone(),
                error: f.error.clone(),
            })
            .collect();
        let total = generated.len() + failed.len();
        Self {
            generated,
            failed,
            total,
        }
    }
}
