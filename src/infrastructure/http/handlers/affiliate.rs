//! Affiliate Handlers - 带货素材管线

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::GenerateAffiliateCommand;
use crate::domain::affiliate::AffiliateBrief;
use crate::infrastructure::http::dto::{ApiResponse, BatchSummaryDto, ReferenceImageDto};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

fn default_style() -> String {
    "UGC natural".to_string()
}

#[derive(Debug, Deserialize)]
pub struct GenerateAffiliateRequest {
    pub session_id: String,
    pub product_name: String,
    #[serde(default)]
    pub custom_instructions: String,
    #[serde(default = "default_style")]
    pub style: String,
    pub num_scenes: u32,
    /// 商品参考图（data-URL 或裸 base64）
    #[serde(default)]
    pub product_image: Option<ReferenceImageDto>,
    /// 模特参考图
    #[serde(default)]
    pub model_image: Option<ReferenceImageDto>,
}

#[derive(Debug, Serialize)]
pub struct GenerateAffiliateDto {
    pub brief: AffiliateBrief,
    pub images: BatchSummaryDto,
}

pub async fn generate_affiliate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateAffiliateRequest>,
) -> Result<Json<ApiResponse<GenerateAffiliateDto>>, ApiError> {
    let product_image = req
        .product_image
        .as_ref()
        .map(ReferenceImageDto::decode)
        .transpose()
        .map_err(ApiError::BadRequest)?;
    let model_image = req
        .model_image
        .as_ref()
        .map(ReferenceImageDto::decode)
        .transpose()
        .map_err(ApiError::BadRequest)?;

    let cmd = GenerateAffiliateCommand {
        session_id: req.session_id,
        product_name: req.product_name,
        custom_instructions: req.custom_instructions,
        style: req.style,
        requested_scenes: req.num_scenes,
        product_image,
        model_image,
    };

    let result = state.generate_affiliate_handler.handle(cmd).await?;

    Ok(Json(ApiResponse::success(GenerateAffiliateDto {
        brief: result.brief,
        images: BatchSummaryDto::new(result.generated, &result.failed),
    })))
}
