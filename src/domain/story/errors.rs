//! Story Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoryError {
    #[error("无效的标题: {0}")]
    InvalidTitle(String),

    #[error("无效的场景数: {0}")]
    InvalidSceneCount(u32),

    #[error("场景总数不符合 N+1 规则: 期望 {expected}, 实际 {actual}")]
    SceneCountMismatch { expected: usize, actual: usize },

    #[error("最后一个场景缺少 SOURCE_VERIFICATION 基调")]
    MissingVerificationScene,

    #[error("非末位场景 {0} 使用了 SOURCE_VERIFICATION 基调")]
    MisplacedVerificationScene(u32),

    #[error("场景编号不连续: 第 {index} 个场景编号为 {number}")]
    NonDenseNumbering { index: usize, number: u32 },

    #[error("hashtag 数量必须为 5, 实际 {0}")]
    HashtagCount(usize),
}
