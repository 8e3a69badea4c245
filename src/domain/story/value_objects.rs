//! Story Context - Value Objects

use serde::{Deserialize, Serialize};

/// 溯源场景的哨兵 tone 值
///
/// 生成序列中只有最后一个场景允许使用该值
pub const SOURCE_VERIFICATION_TONE: &str = "SOURCE_VERIFICATION";

/// 场景叙事基调
///
/// 自由文本，仅 `SOURCE_VERIFICATION` 具有结构含义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tone(String);

impl Tone {
    pub fn new(tone: impl Into<String>) -> Self {
        Self(tone.into())
    }

    /// 是否为溯源场景
    pub fn is_source_verification(&self) -> bool {
        self.0 == SOURCE_VERIFICATION_TONE
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 结构化提示词
///
/// 六个字段全部必填，字段顺序固定。`consolidate` 按固定顺序拼接出
/// 发送给图像生成的规范提示词文本，相同输入必得相同输出。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredPrompt {
    pub subject: String,
    pub action: String,
    pub environment: String,
    pub camera_movement: String,
    pub lighting: String,
    pub visual_style_tags: String,
}

impl StructuredPrompt {
    /// 拼接为单条自然语言提示词
    ///
    /// 字段顺序: subject, action, environment, camera_movement, lighting,
    /// visual_style_tags
    pub fn consolidate(&self) -> String {
        format!(
            "{}, {}, in {}. Camera: {}. Lighting: {}. Style: {}",
            self.subject,
            self.action,
            self.environment,
            self.camera_movement,
            self.lighting,
            self.visual_style_tags
        )
    }
}
