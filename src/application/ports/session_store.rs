//! Session Store Port - 会话产物仓库抽象
//!
//! 每个会话持有一片显式管理的产物区（arena）:
//! - 当前故事脚本
//! - 图库（string key → 图像字节，key 冲突为覆盖写）
//! - 按场景号缓存的音频产物（随所用音色一起记录）
//! - 播放互斥状态: 任意时刻至多一个场景处于"生成或播放中"
//!
//! 所有产物在会话关闭时显式释放，不依赖隐式回收

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::story::StoryScript;

/// 会话错误
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),
}

/// 场景音频产物
///
/// 记录合成所用音色；音色变更后该产物即失效
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    pub scene: u32,
    pub voice: String,
    pub wav: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

impl AudioArtifact {
    pub fn new(scene: u32, voice: impl Into<String>, wav: Vec<u8>) -> Self {
        Self {
            scene,
            voice: voice.into(),
            wav,
            created_at: Utc::now(),
        }
    }
}

/// Session Store Port
pub trait SessionStorePort: Send + Sync {
    /// 打开新会话，返回会话 ID
    fn open(&self) -> String;

    /// 会话是否存在
    fn is_valid(&self, id: &str) -> bool;

    /// 关闭会话并释放其全部产物
    fn close(&self, id: &str) -> Result<(), SessionError>;

    /// 刷新会话活跃时间
    fn touch(&self, id: &str);

    /// 存入当前故事脚本
    fn set_script(&self, id: &str, script: StoryScript) -> Result<(), SessionError>;

    /// 读取当前故事脚本
    fn get_script(&self, id: &str) -> Result<Option<StoryScript>, SessionError>;

    /// 存入图像产物；key 冲突时覆盖旧产物（last-write-wins）
    fn insert_image(&self, id: &str, key: &str, image: Vec<u8>) -> Result<(), SessionError>;

    /// 读取图像产物
    fn get_image(&self, id: &str, key: &str) -> Result<Option<Vec<u8>>, SessionError>;

    /// 场景当前音色（未设置时为默认音色）
    fn voice_of(&self, id: &str, scene: u32) -> Result<String, SessionError>;

    /// 切换场景音色
    ///
    /// 旧音色的缓存音频立即失效释放，并复位该场景的播放状态
    fn set_voice(&self, id: &str, scene: u32, voice: &str) -> Result<(), SessionError>;

    /// 读取场景缓存音频；仅当缓存音色与当前音色一致时返回
    fn cached_audio(&self, id: &str, scene: u32) -> Result<Option<AudioArtifact>, SessionError>;

    /// 缓存场景音频产物
    fn store_audio(&self, id: &str, artifact: AudioArtifact) -> Result<(), SessionError>;

    /// 尝试获取播放权
    ///
    /// 会话内已有场景处于生成/播放状态时返回 false（调用方按 no-op
    /// 处理，不排队）；同一场景重复请求同样返回 false
    fn try_begin_playback(&self, id: &str, scene: u32) -> Result<bool, SessionError>;

    /// 结束播放，释放播放权
    ///
    /// 仅当该场景持有播放权时生效
    fn end_playback(&self, id: &str, scene: u32) -> Result<(), SessionError>;

    /// 列出空闲超时的会话 ID
    fn expired_sessions(&self, idle_timeout_secs: u64) -> Vec<String>;
}
