//! Affiliate Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AffiliateError {
    #[error("无效的商品名: {0}")]
    InvalidProductName(String),

    #[error("无效的场景数: {0}")]
    InvalidSceneCount(u32),

    #[error("素材清单为空")]
    EmptyAssets,

    #[error("素材 label 重复: {0}")]
    DuplicateLabel(String),
}
