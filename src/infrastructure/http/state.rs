//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    ChangeSceneVoiceHandler, CloseSessionHandler, GenerateAffiliateHandler, GenerateStoryHandler,
    OpenSessionHandler, PlaySceneAudioHandler, PlaybackDoneHandler, VisualizeSceneHandler,
    VisualizeStoryHandler,
    // Query handlers
    GetAudioHandler, GetImageHandler,
    // Ports
    GenerationGatewayPort, SessionStorePort,
};
use crate::infrastructure::events::EventPublisher;

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub sessions: Arc<dyn SessionStorePort>,
    pub gateway: Arc<dyn GenerationGatewayPort>,
    pub event_publisher: Arc<EventPublisher>,

    // ========== Command Handlers ==========
    pub generate_story_handler: GenerateStoryHandler,
    pub visualize_scene_handler: VisualizeSceneHandler,
    pub visualize_story_handler: VisualizeStoryHandler,
    pub generate_affiliate_handler: GenerateAffiliateHandler,
    pub open_session_handler: OpenSessionHandler,
    pub close_session_handler: CloseSessionHandler,
    pub change_voice_handler: ChangeSceneVoiceHandler,
    pub playback_done_handler: PlaybackDoneHandler,
    pub play_scene_audio_handler: PlaySceneAudioHandler,

    // ========== Query Handlers ==========
    pub get_image_handler: GetImageHandler,
    pub get_audio_handler: GetAudioHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        sessions: Arc<dyn SessionStorePort>,
        gateway: Arc<dyn GenerationGatewayPort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            // Ports
            sessions: sessions.clone(),
            gateway: gateway.clone(),
            event_publisher: event_publisher.clone(),

            // Command handlers
            generate_story_handler: GenerateStoryHandler::new(
                gateway.clone(),
                sessions.clone(),
                event_publisher.clone(),
            ),
            visualize_scene_handler: VisualizeSceneHandler::new(
                gateway.clone(),
                sessions.clone(),
                event_publisher.clone(),
            ),
            visualize_story_handler: VisualizeStoryHandler::new(
                gateway.clone(),
                sessions.clone(),
                event_publisher.clone(),
            ),
            generate_affiliate_handler: GenerateAffiliateHandler::new(
                gateway.clone(),
                sessions.clone(),
                event_publisher.clone(),
            ),
            open_session_handler: OpenSessionHandler::new(
                sessions.clone(),
                event_publisher.clone(),
            ),
            close_session_handler: CloseSessionHandler::new(
                sessions.clone(),
                event_publisher.clone(),
            ),
            change_voice_handler: ChangeSceneVoiceHandler::new(sessions.clone()),
            playback_done_handler: PlaybackDoneHandler::new(sessions.clone()),
            play_scene_audio_handler: PlaySceneAudioHandler::new(
                gateway.clone(),
                sessions.clone(),
                event_publisher.clone(),
            ),

            // Query handlers
            get_image_handler: GetImageHandler::new(sessions.clone()),
            get_audio_handler: GetAudioHandler::new(sessions.clone()),
        }
    }
}
