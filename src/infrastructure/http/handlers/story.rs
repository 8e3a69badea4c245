//! Story Handlers - 故事脚本生成与可视化

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::ports::AspectRatio;
use crate::application::{
    GenerateStoryCommand, PromptVariant, VisualizeSceneCommand, VisualizeStoryCommand,
};
use crate::domain::story::StoryScript;
use crate::infrastructure::http::dto::{ApiResponse, BatchSummaryDto};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

fn default_visual_style() -> String {
    "Cinematic documentary, photorealistic".to_string()
}

fn default_language() -> String {
    "Indonesia".to_string()
}

fn default_variant() -> PromptVariant {
    PromptVariant::A
}

fn default_aspect_ratio() -> AspectRatio {
    AspectRatio::Vertical
}

// ============================================================================
// Generate Story
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GenerateStoryRequest {
    pub session_id: String,
    pub title: String,
    pub num_scenes: u32,
    #[serde(default = "default_visual_style")]
    pub visual_style: String,
    #[serde(default = "default_language")]
    pub language: String,
}

pub async fn generate_story(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateStoryRequest>,
) -> Result<Json<ApiResponse<StoryScript>>, ApiError> {
    let cmd = GenerateStoryCommand {
        session_id: req.session_id,
        title: req.title,
        requested_scenes: req.num_scenes,
        visual_style: req.visual_style,
        language: req.language,
    };

    let script = state.generate_story_handler.handle(cmd).await?;

    Ok(Json(ApiResponse::success(script)))
}

// ============================================================================
// Visualize Scene
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct VisualizeSceneRequest {
    pub session_id: String,
    pub scene_number: u32,
    #[serde(default = "default_variant")]
    pub variant: PromptVariant,
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: AspectRatio,
}

#[derive(Debug, Serialize)]
pub struct VisualizeSceneDto {
    pub key: String,
}

pub async fn visualize_scene(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VisualizeSceneRequest>,
) -> Result<Json<ApiResponse<VisualizeSceneDto>>, ApiError> {
    let cmd = VisualizeSceneCommand {
        session_id: req.session_id,
        scene_number: req.scene_number,
        variant: req.variant,
        aspect_ratio: req.aspect_ratio,
    };

    let result = state.visualize_scene_handler.handle(cmd).await?;

    Ok(Json(ApiResponse::success(VisualizeSceneDto {
        key: result.key,
    })))
}

// ============================================================================
// Visualize Story (batch)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct VisualizeStoryRequest {
    pub session_id: String,
}

pub async fn visualize_story(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VisualizeStoryRequest>,
) -> Result<Json<ApiResponse<BatchSummaryDto>>, ApiError> {
    let cmd = VisualizeStoryCommand {
        session_id: req.session_id,
    };

    let result = state.visualize_story_handler.handle(cmd).await?;

    Ok(Json(ApiResponse::success(BatchSummaryDto::new(
        result.generated,
        &result.failed,
    ))))
}
