//! Command Handlers

pub mod affiliate_handlers;
pub mod session_handlers;
pub mod story_handlers;

pub use affiliate_handlers::GenerateAffiliateHandler;
pub use session_handlers::{
    ChangeSceneVoiceHandler, CloseSessionHandler, OpenSessionHandler, PlaySceneAudioHandler,
    PlaybackDoneHandler,
};
pub use story_handlers::{GenerateStoryHandler, VisualizeSceneHandler, VisualizeStoryHandler};
