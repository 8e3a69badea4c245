//! Affiliate Context - Value Objects

use serde::{Deserialize, Serialize};

/// 单个带货素材
///
/// `label` 在一份清单内唯一，下游以它作为图库 key
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSpec {
    pub label: String,
    pub image_prompt: String,
    pub video_prompt: String,
}
