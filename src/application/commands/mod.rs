//! Application Commands - CQRS 命令定义与处理器

pub mod affiliate_commands;
pub mod handlers;
pub mod session_commands;
pub mod story_commands;

pub use affiliate_commands::{GenerateAffiliateCommand, GenerateAffiliateResponse};
pub use handlers::{
    ChangeSceneVoiceHandler, CloseSessionHandler, GenerateAffiliateHandler, GenerateStoryHandler,
    OpenSessionHandler, PlaySceneAudioHandler, PlaybackDoneHandler, VisualizeSceneHandler,
    VisualizeStoryHandler,
};
pub use session_commands::{
    ChangeSceneVoiceCommand, PlayOutcome, PlaySceneAudioCommand, PlaybackDoneCommand,
};
pub use story_commands::{
    GenerateStoryCommand, PromptVariant, VisualizeSceneCommand, VisualizeSceneResponse,
    VisualizeStoryCommand, VisualizeStoryResponse,
};
