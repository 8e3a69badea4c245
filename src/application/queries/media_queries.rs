//! Media Queries - 会话产物读取

/// 读取图库中的图像产物
#[derive(Debug, Clone)]
pub struct GetImageQuery {
    pub session_id: String,
    pub key: String,
}

/// 读取场景缓存音频
#[derive(Debug, Clone)]
pub struct GetAudioQuery {
    pub session_id: String,
    pub scene_number: u32,
}
