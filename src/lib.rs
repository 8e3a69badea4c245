//! Anoa - 事实核验故事与带货素材生成服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Story Context: N+1 故事脚本（叙事场景 + 来源核验场景）
//! - Affiliate Context: 带货素材清单
//! - Audio: PCM → WAV 编码与头解析
//!
//! 应用层 (application/):
//! - Ports: 端口定义（GenerationGateway, SessionStore）
//! - Commands: CQRS 命令处理器（故事/带货/会话音频管线）
//! - Queries: CQRS 查询处理器（会话产物读取）
//! - Batch: 顺序批处理原语（部分失败容忍）
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + WebSocket
//! - Memory: 会话产物区内存实现
//! - Adapters: Gemini HTTP / Fake 生成端
//! - Events: WebSocket 事件发布

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
