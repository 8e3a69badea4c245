//! Event Publisher Implementation
//!
//! WebSocket 事件推送实现。全部事件以会话为作用域：每个会话注册一个
//! broadcast 通道，WS 连接按会话订阅。

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// WebSocket 事件类型
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum WsEvent {
    /// 故事脚本生成完成
    StoryReady {
        session_id: String,
        title: String,
        total_scenes: usize,
    },
    /// 故事脚本生成失败
    StoryFailed {
        session_id: String,
        error: String,
    },
    /// 带货素材清单生成完成
    BriefReady {
        session_id: String,
        asset_count: usize,
    },
    /// 带货素材清单生成失败
    BriefFailed {
        session_id: String,
        error: String,
    },
    /// 批处理进度（done 为已开始处理的条目序号，从 0 起）
    BatchProgress {
        session_id: String,
        done: usize,
        total: usize,
    },
    /// 单张图像生成完成
    ImageReady {
        session_id: String,
        key: String,
    },
    /// 单张图像生成失败（批处理继续）
    ImageFailed {
        session_id: String,
        key: String,
        error: String,
    },
    /// 场景音频合成完成
    SceneAudioReady {
        session_id: String,
        scene: u32,
        voice: String,
    },
    /// 会话关闭
    SessionClosed {
        session_id: String,
        reason: String,
    },
}

/// 事件发布器
pub struct EventPublisher {
    /// session_id -> broadcast sender
    session_channels: DashMap<String, broadcast::Sender<WsEvent>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            session_channels: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 注册会话的事件通道
    pub fn register_session(&self, session_id: &str) -> broadcast::Receiver<WsEvent> {
        if let Some(sender) = self.session_channels.get(session_id) {
            return sender.subscribe();
        }

        let (tx, rx) = broadcast::channel(100);
        self.session_channels.insert(session_id.to_string(), tx);
        rx
    }

    /// 取消注册会话
    pub fn unregister_session(&self, session_id: &str) {
        self.session_channels.remove(session_id);
    }

    /// 获取会话的事件接收器
    pub fn subscribe(&self, session_id: &str) -> Option<broadcast::Receiver<WsEvent>> {
        self.session_channels.get(session_id).map(|s| s.subscribe())
    }

    /// 发布故事脚本生成完成事件
    pub fn publish_story_ready(&self, session_id: &str, title: &str, total_scenes: usize) {
        self.publish_to_session(
            session_id,
            WsEvent::StoryReady {
                session_id: session_id.to_string(),
                title: title.to_string(),
                total_scenes,
            },
        );
    }

    /// 发布故事脚本生成失败事件
    pub fn publish_story_failed(&self, session_id: &str, error: &str) {
        self.publish_to_session(
            session_id,
            WsEvent::StoryFailed {
                session_id: session_id.to_string(),
                error: error.to_string(),
            },
        );
    }

    /// 发布素材清单完成事件
    pub fn publish_brief_ready(&self, session_id: &str, asset_count: usize) {
        self.publish_to_session(
            session_id,
            WsEvent::BriefReady {
                session_id: session_id.to_string(),
                asset_count,
            },
        );
    }

    /// 发布素材清单失败事件
    pub fn publish_brief_failed(&self, session_id: &str, error: &str) {
        self.publish_to_session(
            session_id,
            WsEvent::BriefFailed {
                session_id: session_id.to_string(),
                error: error.to_string(),
            },
        );
    }

    /// 发布批处理进度事件
    pub fn publish_batch_progress(&self, session_id: &str, done: usize, total: usize) {
        self.publish_to_session(
            session_id,
            WsEvent::BatchProgress {
                session_id: session_id.to_string(),
                done,
                total,
            },
        );
    }

    /// 发布图像生成完成事件
    pub fn publish_image_ready(&self, session_id: &str, key: &str) {
        self.publish_to_session(
            session_id,
            WsEvent::ImageReady {
                session_id: session_id.to_string(),
                key: key.to_string(),
            },
        );
    }

    /// 发布图像生成失败事件
    pub fn publish_image_failed(&self, session_id: &str, key: &str, error: &str) {
        self.publish_to_session(
            session_id,
            WsEvent::ImageFailed {
                session_id: session_id.to_string(),
                key: key.to_string(),
                error: error.to_string(),
            },
        );
    }

    /// 发布场景音频合成完成事件
    pub fn publish_scene_audio_ready(&self, session_id: &str, scene: u32, voice: &str) {
        self.publish_to_session(
            session_id,
            WsEvent::SceneAudioReady {
                session_id: session_id.to_string(),
                scene,
                voice: voice.to_string(),
            },
        );
    }

    /// 发布会话关闭事件
    pub fn publish_session_closed(&self, session_id: &str, reason: &str) {
        self.publish_to_session(
            session_id,
            WsEvent::SessionClosed {
                session_id: session_id.to_string(),
                reason: reason.to_string(),
            },
        );
    }

    /// 发布事件到指定会话
    fn publish_to_session(&self, session_id: &str, event: WsEvent) {
        if let Some(sender) = self.session_channels.get(session_id) {
            if let Err(e) = sender.send(event) {
                tracing::debug!(
                    session_id = %session_id,
                    error = %e,
                    "Failed to publish event (no receivers)"
                );
            }
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_registered_session_receives_events() {
        let publisher = EventPublisher::new();
        let mut rx = publisher.register_session("s1");

        publisher.publish_image_ready("s1", "scene-1-a");

        let event = rx.recv().await.unwrap();
        match event {
            WsEvent::ImageReady { session_id, key } => {
                assert_eq!(session_id, "s1");
                assert_eq!(key, "scene-1-a");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_events_do_not_cross_sessions() {
        let publisher = EventPublisher::new();
        let mut rx1 = publisher.register_session("s1");
        let _rx2 = publisher.register_session("s2");

        publisher.publish_batch_progress("s2", 1, 3);
        publisher.publish_batch_progress("s1", 0, 5);

        let event = rx1.recv().await.unwrap();
        match event {
            WsEvent::BatchProgress { done, total, .. } => {
                assert_eq!((done, total), (0, 5));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unregistered_session_publish_is_noop() {
        let publisher = EventPublisher::new();
        // 无通道时发布不 panic，事件直接丢弃
        publisher.publish_story_failed("ghost", "whatever");
        assert!(publisher.subscribe("ghost").is_none());
    }

    #[test]
    fn test_event_serializes_with_tag_and_data() {
        let event = WsEvent::SceneAudioReady {
            session_id: "s1".to_string(),
            scene: 3,
            voice: "Kore".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "SceneAudioReady");
        assert_eq!(json["data"]["scene"], 3);
        assert_eq!(json["data"]["voice"], "Kore");
    }
}
