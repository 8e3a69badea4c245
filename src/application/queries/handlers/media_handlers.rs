//! Media Query Handlers - 图像与音频产物读取

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{AudioArtifact, SessionStorePort};
use crate::application::queries::media_queries::*;

/// GetImage Handler - 按 key 读取图库产物
pub struct GetImageHandler {
    sessions: Arc<dyn SessionStorePort>,
}

impl GetImageHandler {
    pub fn new(sessions: Arc<dyn SessionStorePort>) -> Self {
        Self { sessions }
    }

    pub fn handle(&self, query: GetImageQuery) -> Result<Vec<u8>, ApplicationError> {
        self.sessions
            .get_image(&query.session_id, &query.key)?
            .ok_or_else(|| ApplicationError::not_found("Image", &query.key))
    }
}

/// GetAudio Handler - 读取场景缓存音频
///
/// 只返回音色一致的缓存；音色刚切换过的场景视为无音频
pub struct GetAudioHandler {
    sessions: Arc<dyn SessionStorePort>,
}

impl GetAudioHandler {
    pub fn new(sessions: Arc<dyn SessionStorePort>) -> Self {
        Self { sessions }
    }

    pub fn handle(&self, query: GetAudioQuery) -> Result<AudioArtifact, ApplicationError> {
        self.sessions
            .cached_audio(&query.session_id, query.scene_number)?
            .ok_or_else(|| {
                ApplicationError::not_found("Audio", query.scene_number.to_string())
            })
    }
}
