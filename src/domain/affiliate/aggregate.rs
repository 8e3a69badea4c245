//! Affiliate Context - Aggregate Root
//!
//! 不变量:
//! - 清单内素材 label 互不相同（下游以 label 作为图库 key，
//!   重复意味着静默覆盖，这里显式拒绝）

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::errors::AffiliateError;
use super::value_objects::AssetSpec;

/// 带货素材生成请求
///
/// 参考图片由调用方以字节形式单独携带，不属于领域模型
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffiliateRequest {
    pub product_name: String,
    pub custom_instructions: String,
    pub style: String,
    pub requested_scenes: u32,
}

impl AffiliateRequest {
    pub fn new(
        product_name: impl Into<String>,
        custom_instructions: impl Into<String>,
        style: impl Into<String>,
        requested_scenes: u32,
    ) -> Result<Self, AffiliateError> {
        let product_name = product_name.into();
        if product_name.trim().is_empty() {
            return Err(AffiliateError::InvalidProductName(product_name));
        }
        if requested_scenes == 0 {
            return Err(AffiliateError::InvalidSceneCount(requested_scenes));
        }
        Ok(Self {
            product_name,
            custom_instructions: custom_instructions.into(),
            style: style.into(),
            requested_scenes,
        })
    }
}

/// 带货素材清单聚合根
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffiliateBrief {
    pub summary: String,
    pub caption: String,
    pub assets: Vec<AssetSpec>,
}

impl AffiliateBrief {
    /// 反序列化之后立即执行的结构校验
    pub fn validate(&self) -> Result<(), AffiliateError> {
        if self.assets.is_empty() {
            return Err(AffiliateError::EmptyAssets);
        }

        let mut seen = HashSet::new();
        for asset in &self.assets {
            if !seen.insert(asset.label.as_str()) {
                return Err(AffiliateError::DuplicateLabel(asset.label.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(label: &str) -> AssetSpec {
        AssetSpec {
            label: label.to_string(),
            image_prompt: format!("image prompt for {}", label),
            video_prompt: format!("video prompt for {}", label),
        }
    }

    #[test]
    fn test_request_rejects_empty_product() {
        assert!(AffiliateRequest::new("", "", "problem/solution", 2).is_err());
    }

    #[test]
    fn test_request_rejects_zero_scenes() {
        assert!(AffiliateRequest::new("Serum X", "", "problem/solution", 0).is_err());
    }

    #[test]
    fn test_valid_brief_passes() {
        let brief = AffiliateBrief {
            summary: "s".into(),
            caption: "c".into(),
            assets: vec![asset("Hook"), asset("Demo"), asset("CTA")],
        };
        assert!(brief.validate().is_ok());
    }

    #[test]
    fn test_empty_assets_rejected() {
        let brief = AffiliateBrief {
            summary: "s".into(),
            caption: "c".into(),
            assets: vec![],
        };
        assert!(matches!(brief.validate(), Err(AffiliateError::EmptyAssets)));
    }

    #[test]
    fn test_duplicate_label_rejected() {
        let brief = AffiliateBrief {
            summary: "s".into(),
            caption: "c".into(),
            assets: vec![asset("Hook"), asset("Hook")],
        };
        match brief.validate() {
            Err(AffiliateError::DuplicateLabel(label)) => assert_eq!(label, "Hook"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_deserializes_provider_field_names() {
        let json = serde_json::json!({
            "summary": "ringkasan",
            "caption": "caption viral",
            "assets": [
                { "label": "Hook", "imagePrompt": "ip", "videoPrompt": "vp" }
            ]
        });
        let brief: AffiliateBrief = serde_json::from_value(json).unwrap();
        assert_eq!(brief.assets[0].image_prompt, "ip");
        assert_eq!(brief.assets[0].video_prompt, "vp");
    }
}
