//! Session Handlers - 会话生命周期与场景音频

use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::{
    ChangeSceneVoiceCommand, PlayOutcome, PlaySceneAudioCommand, PlaybackDoneCommand,
};
use crate::infrastructure::http::dto::{ApiResponse, Empty};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// Open / Close
// ============================================================================

#[derive(Debug, Serialize)]
pub struct OpenSessionDto {
    pub session_id: String,
}

pub async fn open_session(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<OpenSessionDto>> {
    let session_id = state.open_session_handler.handle();
    Json(ApiResponse::success(OpenSessionDto { session_id }))
}

#[derive(Debug, Deserialize)]
pub struct CloseSessionRequest {
    pub session_id: String,
}

pub async fn close_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CloseSessionRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state.close_session_handler.handle(&req.session_id)?;
    Ok(Json(ApiResponse::ok()))
}

// ============================================================================
// Change Scene Voice
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ChangeSceneVoiceRequest {
    pub session_id: String,
    pub scene_number: u32,
    pub voice: String,
}

pub async fn change_scene_voice(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChangeSceneVoiceRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    let cmd = ChangeSceneVoiceCommand {
        session_id: req.session_id,
        scene_number: req.scene_number,
        voice: req.voice,
    };
    state.change_voice_handler.handle(cmd)?;
    Ok(Json(ApiResponse::ok()))
}

// ============================================================================
// Playback Done
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PlaybackDoneRequest {
    pub session_id: String,
    pub scene_number: u32,
}

pub async fn playback_done(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PlaybackDoneRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    let cmd = PlaybackDoneCommand {
        session_id: req.session_id,
        scene_number: req.scene_number,
    };
    state.playback_done_handler.handle(cmd)?;
    Ok(Json(ApiResponse::ok()))
}

// ============================================================================
// Play Scene Audio
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PlaySceneAudioRequest {
    pub session_id: String,
    pub scene_number: u32,
}

/// 非 Playing 结果的状态信封
#[derive(Debug, Serialize)]
pub struct PlayStatusDto {
    pub status: &'static str,
}

/// 播放场景旁白
///
/// Playing 返回 WAV 字节（audio/wav，自定义头携带场景与音色），
/// Busy/Reset 返回 JSON 状态信封——两者都不是错误
pub async fn play_scene_audio(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PlaySceneAudioRequest>,
) -> Result<Response, ApiError> {
    let cmd = PlaySceneAudioCommand {
        session_id: req.session_id,
        scene_number: req.scene_number,
    };

    match state.play_scene_audio_handler.handle(cmd).await? {
        PlayOutcome::Playing {
            scene,
            voice,
            wav,
            cached,
        } => {
            let mut headers = HeaderMap::new();
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("audio/wav"));
            headers.insert("X-Scene-Number", HeaderValue::from(scene));
            if let Ok(value) = HeaderValue::from_str(&voice) {
                headers.insert("X-Scene-Voice", value);
            }
            headers.insert(
                "X-Audio-Cached",
                HeaderValue::from_static(if cached { "1" } else { "0" }),
            );
            Ok((StatusCode::OK, headers, wav).into_response())
        }
        PlayOutcome::Busy => {
            Ok(Json(ApiResponse::success(PlayStatusDto { status: "busy" })).into_response())
        }
        PlayOutcome::Reset => {
            Ok(Json(ApiResponse::success(PlayStatusDto { status: "reset" })).into_response())
        }
    }
}
