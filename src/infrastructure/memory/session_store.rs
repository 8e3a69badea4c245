//! In-Memory Session Store Implementation
//!
//! 每个会话一个产物区（arena）：脚本、图库、按场景的音频缓存、
//! 音色覆写与播放互斥状态。会话关闭即整体释放。

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::ports::{AudioArtifact, SessionError, SessionStorePort};
use crate::domain::story::StoryScript;

/// 单个会话的产物区
struct SessionEntry {
    script: Option<StoryScript>,
    /// 图库：key → 编码图像字节
    images: HashMap<String, Vec<u8>>,
    /// 场景号 → 音频产物（始终与合成时音色一起记录）
    audio: HashMap<u32, AudioArtifact>,
    /// 场景号 → 音色覆写；缺省回落到默认音色
    voices: HashMap<u32, String>,
    /// 持有播放权的场景号
    playback: Option<u32>,
    last_activity: DateTime<Utc>,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            script: None,
            images: HashMap::new(),
            audio: HashMap::new(),
            voices: HashMap::new(),
            playback: None,
            last_activity: Utc::now(),
        }
    }
}

/// 内存会话产物仓库
pub struct InMemorySessionStore {
    sessions: DashMap<String, SessionEntry>,
    default_voice: String,
}

impl InMemorySessionStore {
    pub fn new(default_voice: impl Into<String>) -> Self {
        Self {
            sessions: DashMap::new(),
            default_voice: default_voice.into(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn with_entry<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut SessionEntry) -> T,
    ) -> Result<T, SessionError> {
        let mut entry = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        entry.last_activity = Utc::now();
        Ok(f(&mut entry))
    }
}

impl SessionStorePort for InMemorySessionStore {
    fn open(&self) -> String {
        let id = Uuid::new_v4().to_string();
        self.sessions.insert(id.clone(), SessionEntry::new());
        tracing::info!(session_id = %id, "Session arena created");
        id
    }

    fn is_valid(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    fn close(&self, id: &str) -> Result<(), SessionError> {
        self.sessions
            .remove(id)
            .map(|(_, entry)| {
                tracing::info!(
                    session_id = %id,
                    images = entry.images.len(),
                    audio = entry.audio.len(),
                    "Session arena released"
                );
            })
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    fn touch(&self, id: &str) {
        if let Some(mut entry) = self.sessions.get_mut(id) {
            entry.last_activity = Utc::now();
        }
    }

    fn set_script(&self, id: &str, script: StoryScript) -> Result<(), SessionError> {
        self.with_entry(id, |entry| {
            // 新脚本使旧的场景级状态全部失效
            entry.script = Some(script);
            entry.images.clear();
            entry.audio.clear();
            entry.voices.clear();
            entry.playback = None;
        })
    }

    fn get_script(&self, id: &str) -> Result<Option<StoryScript>, SessionError> {
        self.with_entry(id, |entry| entry.script.clone())
    }

    fn insert_image(&self, id: &str, key: &str, image: Vec<u8>) -> Result<(), SessionError> {
        self.with_entry(id, |entry| {
            if entry.images.insert(key.to_string(), image).is_some() {
                tracing::debug!(session_id = %id, key = %key, "Image overwritten");
            }
        })
    }

    fn get_image(&self, id: &str, key: &str) -> Result<Option<Vec<u8>>, SessionError> {
        self.with_entry(id, |entry| entry.images.get(key).cloned())
    }

    fn voice_of(&self, id: &str, scene: u32) -> Result<String, SessionError> {
        self.with_entry(id, |entry| {
            entry
                .voices
                .get(&scene)
                .cloned()
                .unwrap_or_else(|| self.default_voice.clone())
        })
    }

    fn set_voice(&self, id: &str, scene: u32, voice: &str) -> Result<(), SessionError> {
        self.with_entry(id, |entry| {
            entry.voices.insert(scene, voice.to_string());
            // 旧音色的产物立即失效
            entry.audio.remove(&scene);
            if entry.playback == Some(scene) {
                entry.playback = None;
            }
        })
    }

    fn cached_audio(&self, id: &str, scene: u32) -> Result<Option<AudioArtifact>, SessionError> {
        let current_voice = self.voice_of(id, scene)?;
        self.with_entry(id, |entry| {
            entry
                .audio
                .get(&scene)
                .filter(|artifact| artifact.voice == current_voice)
                .cloned()
        })
    }

    fn store_audio(&self, id: &str, artifact: AudioArtifact) -> Result<(), SessionError> {
        self.with_entry(id, |entry| {
            entry.audio.insert(artifact.scene, artifact);
        })
    }

    fn try_begin_playback(&self, id: &str, scene: u32) -> Result<bool, SessionError> {
        self.with_entry(id, |entry| {
            if entry.playback.is_some() {
                return false;
            }
            entry.playback = Some(scene);
            true
        })
    }

    fn end_playback(&self, id: &str, scene: u32) -> Result<(), SessionError> {
        self.with_entry(id, |entry| {
            if entry.playback == Some(scene) {
                entry.playback = None;
            }
        })
    }

    fn expired_sessions(&self, idle_timeout_secs: u64) -> Vec<String> {
        let now = Utc::now();
        let timeout = chrono::Duration::seconds(idle_timeout_secs as i64);

        self.sessions
            .iter()
            .filter_map(|entry| {
                if now - entry.last_activity > timeout {
                    Some(entry.key().clone())
                } else {
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> InMemorySessionStore {
        InMemorySessionStore::new("Kore")
    }

    #[test]
    fn test_session_lifecycle() {
        let store = store();
        let id = store.open();
        assert!(store.is_valid(&id));

        store.insert_image(&id, "scene-1-a", vec![1, 2, 3]).unwrap();
        assert_eq!(store.get_image(&id, "scene-1-a").unwrap(), Some(vec![1, 2, 3]));

        store.close(&id).unwrap();
        assert!(!store.is_valid(&id));
        assert!(store.get_image(&id, "scene-1-a").is_err());
    }

    #[test]
    fn test_unknown_session_rejected() {
        let store = store();
        assert!(matches!(
            store.close("ghost"),
            Err(SessionError::NotFound(_))
        ));
        assert!(store.get_script("ghost").is_err());
    }

    #[test]
    fn test_image_key_conflict_is_overwrite() {
        let store = store();
        let id = store.open();
        store.insert_image(&id, "k", vec![1]).unwrap();
        store.insert_image(&id, "k", vec![2]).unwrap();
        assert_eq!(store.get_image(&id, "k").unwrap(), Some(vec![2]));
    }

    #[test]
    fn test_default_voice_until_overridden() {
        let store = store();
        let id = store.open();
        assert_eq!(store.voice_of(&id, 1).unwrap(), "Kore");
        store.set_voice(&id, 1, "Puck").unwrap();
        assert_eq!(store.voice_of(&id, 1).unwrap(), "Puck");
        // 其他场景不受影响
        assert_eq!(store.voice_of(&id, 2).unwrap(), "Kore");
    }

    #[test]
    fn test_voice_change_invalidates_cached_audio() {
        let store = store();
        let id = store.open();
        store
            .store_audio(&id, AudioArtifact::new(1, "Kore", vec![0; 44]))
            .unwrap();
        assert!(store.cached_audio(&id, 1).unwrap().is_some());

        store.set_voice(&id, 1, "Zephyr").unwrap();
        assert!(store.cached_audio(&id, 1).unwrap().is_none());
    }

    #[test]
    fn test_cached_audio_requires_matching_voice() {
        let store = store();
        let id = store.open();
        // 产物记录的音色与当前音色不一致时视为无缓存
        store
            .store_audio(&id, AudioArtifact::new(1, "Charon", vec![0; 44]))
            .unwrap();
        assert!(store.cached_audio(&id, 1).unwrap().is_none());
    }

    #[test]
    fn test_playback_mutual_exclusion() {
        let store = store();
        let id = store.open();

        assert!(store.try_begin_playback(&id, 1).unwrap());
        // 其他场景与同一场景的重复请求都拿不到播放权
        assert!(!store.try_begin_playback(&id, 2).unwrap());
        assert!(!store.try_begin_playback(&id, 1).unwrap());

        store.end_playback(&id, 1).unwrap();
        assert!(store.try_begin_playback(&id, 2).unwrap());
    }

    #[test]
    fn test_end_playback_only_for_holder() {
        let store = store();
        let id = store.open();
        assert!(store.try_begin_playback(&id, 1).unwrap());

        // 非持有场景的 end 不释放播放权
        store.end_playback(&id, 2).unwrap();
        assert!(!store.try_begin_playback(&id, 3).unwrap());

        store.end_playback(&id, 1).unwrap();
        assert!(store.try_begin_playback(&id, 3).unwrap());
    }

    #[test]
    fn test_voice_change_resets_playback_of_that_scene() {
        let store = store();
        let id = store.open();
        assert!(store.try_begin_playback(&id, 1).unwrap());

        store.set_voice(&id, 1, "Puck").unwrap();
        assert!(store.try_begin_playback(&id, 2).unwrap());
    }

    #[test]
    fn test_playback_isolated_between_sessions() {
        let store = store();
        let a = store.open();
        let b = store.open();
        assert!(store.try_begin_playback(&a, 1).unwrap());
        assert!(store.try_begin_playback(&b, 1).unwrap());
    }

    #[test]
    fn test_expired_sessions_listed() {
        let store = store();
        let id = store.open();
        // 刚创建的会话不过期
        assert!(store.expired_sessions(3600).is_empty());
        // 0 秒空闲视为全部过期
        std::thread::sleep(std::time::Duration::from_millis(5));
        let expired = store.expired_sessions(0);
        assert_eq!(expired, vec![id]);
    }
}
