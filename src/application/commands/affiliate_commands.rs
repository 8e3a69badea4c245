//! Affiliate Commands - 带货管线命令定义

use crate::application::batch::BatchFailure;
use crate::application::ports::InlineImage;
use crate::domain::affiliate::AffiliateBrief;

/// 生成带货素材清单并顺序生成场景图
#[derive(Debug, Clone)]
pub struct GenerateAffiliateCommand {
    pub session_id: String,
    pub product_name: String,
    pub custom_instructions: String,
    pub style: String,
    pub requested_scenes: u32,
    /// 商品参考图（同时作为逐素材图像生成的风格锚定）
    pub product_image: Option<InlineImage>,
    /// 模特参考图
    pub model_image: Option<InlineImage>,
}

#[derive(Debug)]
pub struct GenerateAffiliateResponse {
    pub brief: AffiliateBrief,
    /// 成功生成并入库的图库 key（即素材 label），保持素材顺序
    pub generated: Vec<String>,
    pub failed: Vec<BatchFailure>,
}
