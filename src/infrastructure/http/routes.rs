//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                      GET   健康检查
//! - /api/story/generate            POST  生成故事脚本（N+1 契约）
//! - /api/story/visualize           POST  可视化单个场景变体
//! - /api/story/visualize_all       POST  顺序可视化全部叙事场景
//! - /api/affiliate/generate        POST  带货素材清单 + 场景图批处理
//! - /api/session/open              POST  打开会话
//! - /api/session/close             POST  关闭会话
//! - /api/session/voice             POST  切换场景音色
//! - /api/session/playback_done     POST  上报播放结束
//! - /api/session/play              POST  播放场景旁白（WAV 或 busy）
//! - /api/image/:session_id/:key    GET   读取图库产物
//! - /api/audio/:session_id/:scene  GET   读取场景缓存音频
//! - /ws/events/:session_id         WS    会话事件推送

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws/events/:session_id", get(handlers::websocket_handler))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/story", story_routes())
        .nest("/affiliate", affiliate_routes())
        .nest("/session", session_routes())
        .route("/image/:session_id/:key", get(handlers::get_image))
        .route("/audio/:session_id/:scene", get(handlers::get_audio))
}

/// Story 路由
fn story_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate", post(handlers::generate_story))
        .route("/visualize", post(handlers::visualize_scene))
        .route("/visualize_all", post(handlers::visualize_story))
}

/// Affiliate 路由
fn affiliate_routes() -> Router<Arc<AppState>> {
    Router::new().route("/generate", post(handlers::generate_affiliate))
}

/// Session 路由
fn session_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/open", post(handlers::open_session))
        .route("/close", post(handlers::close_session))
        .route("/voice", post(handlers::change_scene_voice))
        .route("/playback_done", post(handlers::playback_done))
        .route("/play", post(handlers::play_scene_audio))
}
