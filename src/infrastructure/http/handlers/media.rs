//! Media Handlers - 会话产物下载

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::application::{GetAudioQuery, GetImageQuery};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 读取图库产物（PNG 字节）
pub async fn get_image(
    State(state): State<Arc<AppState>>,
    Path((session_id, key)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let bytes = state.get_image_handler.handle(GetImageQuery {
        session_id,
        key,
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/png"));
    Ok((StatusCode::OK, headers, bytes).into_response())
}

/// 读取场景缓存音频（WAV 字节）
pub async fn get_audio(
    State(state): State<Arc<AppState>>,
    Path((session_id, scene)): Path<(String, u32)>,
) -> Result<Response, ApiError> {
    let artifact = state.get_audio_handler.handle(GetAudioQuery {
        session_id,
        scene_number: scene,
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("audio/wav"));
    headers.insert("X-Scene-Number", HeaderValue::from(artifact.scene));
    if let Ok(value) = HeaderValue::from_str(&artifact.voice) {
        headers.insert("X-Scene-Voice", value);
    }
    Ok((StatusCode::OK, headers, artifact.wav).into_response())
}
