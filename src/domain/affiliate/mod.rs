//! Affiliate Context - 带货 UGC 限界上下文
//!
//! 职责:
//! - 带货素材生成请求
//! - 素材清单聚合（summary / caption / assets）
//! - label 唯一性校验

mod aggregate;
mod errors;
mod value_objects;

pub use aggregate::{AffiliateBrief, AffiliateRequest};
pub use errors::AffiliateError;
pub use value_objects::AssetSpec;
