//! Session Command Handlers - 会话生命周期与场景音频播放
//!
//! 播放语义：会话内同一时刻至多一个场景处于生成/播放状态。播放权在
//! try_begin_playback 时取得，客户端上报 playback_done 时释放；合成
//! 失败时静默复位，不向用户暴露错误。

use std::sync::Arc;

use crate::application::commands::session_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    AudioArtifact, GenerationGatewayPort, SessionStorePort, SpeechRequest,
};
use crate::domain::audio::encode_wav;
use crate::domain::story::Scene;
use crate::infrastructure::events::EventPublisher;

/// OpenSession Handler - 打开会话并注册事件通道
pub struct OpenSessionHandler {
    sessions: Arc<dyn SessionStorePort>,
    event_publisher: Arc<EventPublisher>,
}

impl OpenSessionHandler {
    pub fn new(sessions: Arc<dyn SessionStorePort>, event_publisher: Arc<EventPublisher>) -> Self {
        Self {
            sessions,
            event_publisher,
        }
    }

    pub fn handle(&self) -> String {
        let session_id = self.sessions.open();
        self.event_publisher.register_session(&session_id);
        tracing::info!(session_id = %session_id, "Session opened");
        session_id
    }
}

/// CloseSession Handler - 关闭会话并释放全部产物
pub struct CloseSessionHandler {
    sessions: Arc<dyn SessionStorePort>,
    event_publisher: Arc<EventPublisher>,
}

impl CloseSessionHandler {
    pub fn new(sessions: Arc<dyn SessionStorePort>, event_publisher: Arc<EventPublisher>) -> Self {
        Self {
            sessions,
            event_publisher,
        }
    }

    pub fn handle(&self, session_id: &str) -> Result<(), ApplicationError> {
        self.event_publisher
            .publish_session_closed(session_id, "client_close");
        self.sessions.close(session_id)?;
        self.event_publisher.unregister_session(session_id);
        tracing::info!(session_id = %session_id, "Session closed");
        Ok(())
    }
}

/// ChangeSceneVoice Handler - 切换音色并使旧音频失效
pub struct ChangeSceneVoiceHandler {
    sessions: Arc<dyn SessionStorePort>,
}

impl ChangeSceneVoiceHandler {
    pub fn new(sessions: Arc<dyn SessionStorePort>) -> Self {
        Self { sessions }
    }

    pub fn handle(&self, cmd: ChangeSceneVoiceCommand) -> Result<(), ApplicationError> {
        if cmd.voice.trim().is_empty() {
            return Err(ApplicationError::validation("Voice name is empty"));
        }

        self.sessions
            .set_voice(&cmd.session_id, cmd.scene_number, &cmd.voice)?;

        tracing::info!(
            session_id = %cmd.session_id,
            scene = cmd.scene_number,
            voice = %cmd.voice,
            "Scene voice changed, cached audio invalidated"
        );
        Ok(())
    }
}

/// PlaybackDone Handler - 客户端播放结束，释放播放权
pub struct PlaybackDoneHandler {
    sessions: Arc<dyn SessionStorePort>,
}

impl PlaybackDoneHandler {
    pub fn new(sessions: Arc<dyn SessionStorePort>) -> Self {
        Self { sessions }
    }

    pub fn handle(&self, cmd: PlaybackDoneCommand) -> Result<(), ApplicationError> {
        self.sessions
            .end_playback(&cmd.session_id, cmd.scene_number)?;
        tracing::debug!(
            session_id = %cmd.session_id,
            scene = cmd.scene_number,
            "Playback finished"
        );
        Ok(())
    }
}

/// PlaySceneAudio Handler - 场景旁白合成与播放互斥
pub struct PlaySceneAudioHandler {
    gateway: Arc<dyn GenerationGatewayPort>,
    sessions: Arc<dyn SessionStorePort>,
    event_publisher: Arc<EventPublisher>,
}

impl PlaySceneAudioHandler {
    pub fn new(
        gateway: Arc<dyn GenerationGatewayPort>,
        sessions: Arc<dyn SessionStorePort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            gateway,
            sessions,
            event_publisher,
        }
    }

    pub async fn handle(&self, cmd: PlaySceneAudioCommand) -> Result<PlayOutcome, ApplicationError> {
        let script = self
            .sessions
            .get_script(&cmd.session_id)?
            .ok_or_else(|| ApplicationError::invalid_state("Session has no story script"))?;

        let scene = script
            .scenes
            .iter()
            .find(|s| s.number == cmd.scene_number)
            .ok_or_else(|| ApplicationError::not_found("Scene", cmd.scene_number.to_string()))?;

        // 播放互斥：已有场景在生成/播放时按 no-op 处理，不排队
        if !self
            .sessions
            .try_begin_playback(&cmd.session_id, cmd.scene_number)?
        {
            tracing::debug!(
                session_id = %cmd.session_id,
                scene = cmd.scene_number,
                "Playback busy, request ignored"
            );
            return Ok(PlayOutcome::Busy);
        }

        let voice = self.sessions.voice_of(&cmd.session_id, cmd.scene_number)?;

        // 缓存命中（音色一致）直接复用，播放权保持到 playback_done
        if let Some(cached) = self.sessions.cached_audio(&cmd.session_id, cmd.scene_number)? {
            tracing::debug!(
                session_id = %cmd.session_id,
                scene = cmd.scene_number,
                voice = %voice,
                "Cached scene audio reused"
            );
            return Ok(PlayOutcome::Playing {
                scene: cmd.scene_number,
                voice,
                wav: cached.wav,
                cached: true,
            });
        }

        match self.synthesize(&cmd.session_id, scene, &voice).await {
            Ok(wav) => {
                self.event_publisher.publish_scene_audio_ready(
                    &cmd.session_id,
                    cmd.scene_number,
                    &voice,
                );
                Ok(PlayOutcome::Playing {
                    scene: cmd.scene_number,
                    voice,
                    wav,
                    cached: false,
                })
            }
            Err(e) => {
                // 音频失败不向用户报错：复位播放状态，仅留日志
                tracing::warn!(
                    session_id = %cmd.session_id,
                    scene = cmd.scene_number,
                    voice = %voice,
                    error = %e,
                    "Scene audio synthesis failed, playback state reset"
                );
                self.sessions
                    .end_playback(&cmd.session_id, cmd.scene_number)?;
                Ok(PlayOutcome::Reset)
            }
        }
    }

    async fn synthesize(
        &self,
        session_id: &str,
        scene: &Scene,
        voice: &str,
    ) -> Result<Vec<u8>, ApplicationError> {
        let reply = self
            .gateway
            .synthesize_speech(SpeechRequest {
                text: scene.narration.clone(),
                voice: voice.to_string(),
            })
            .await?;

        let wav = encode_wav(&reply.pcm, reply.sample_rate)?;

        self.sessions.store_audio(
            session_id,
            AudioArtifact::new(scene.number, voice, wav.clone()),
        )?;

        tracing::info!(
            session_id = %session_id,
            scene = scene.number,
            voice = %voice,
            wav_bytes = wav.len(),
            "Scene audio synthesized"
        );
        Ok(wav)
    }
}
