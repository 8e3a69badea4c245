//! Story Commands - 故事管线命令定义

use serde::{Deserialize, Serialize};

use crate::application::batch::BatchFailure;
use crate::application::ports::AspectRatio;

/// 生成故事脚本
#[derive(Debug, Clone)]
pub struct GenerateStoryCommand {
    pub session_id: String,
    pub title: String,
    pub requested_scenes: u32,
    pub visual_style: String,
    pub language: String,
}

/// 场景提示词变体（每个叙事场景携带 A/B 两个备选）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptVariant {
    A,
    B,
}

impl PromptVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptVariant::A => "a",
            PromptVariant::B => "b",
        }
    }
}

/// 可视化单个场景变体
#[derive(Debug, Clone)]
pub struct VisualizeSceneCommand {
    pub session_id: String,
    pub scene_number: u32,
    pub variant: PromptVariant,
    pub aspect_ratio: AspectRatio,
}

#[derive(Debug, Clone)]
pub struct VisualizeSceneResponse {
    /// 图库 key（`scene-{number}-{variant}`）
    pub key: String,
}

/// 顺序可视化全部叙事场景
#[derive(Debug, Clone)]
pub struct VisualizeStoryCommand {
    pub session_id: String,
}

/// 批量可视化结果
///
/// 部分失败是合法终态，失败条目仅以缺失产物 + 失败清单呈现
#[derive(Debug)]
pub struct VisualizeStoryResponse {
    pub generated: Vec<String>,
    pub failed: Vec<BatchFailure>,
}
