//! Session Commands - 会话与场景音频命令定义

/// 请求播放场景旁白音频
#[derive(Debug, Clone)]
pub struct PlaySceneAudioCommand {
    pub session_id: String,
    pub scene_number: u32,
}

/// 播放请求结果
#[derive(Debug)]
pub enum PlayOutcome {
    /// 获得播放权并产出音频
    Playing {
        scene: u32,
        voice: String,
        wav: Vec<u8>,
        /// 是否复用了缓存产物
        cached: bool,
    },
    /// 已有场景处于生成/播放状态，本次请求为 no-op
    Busy,
    /// 合成失败，播放状态已静默复位（无用户可见错误）
    Reset,
}

/// 切换场景音色
#[derive(Debug, Clone)]
pub struct ChangeSceneVoiceCommand {
    pub session_id: String,
    pub scene_number: u32,
    pub voice: String,
}

/// 客户端上报播放结束，释放播放权
#[derive(Debug, Clone)]
pub struct PlaybackDoneCommand {
    pub session_id: String,
    pub scene_number: u32,
}
