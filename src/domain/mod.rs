//! Domain Layer - 领域层
//!
//! - Story Context: 事实核查故事脚本上下文
//! - Affiliate Context: 带货 UGC 素材上下文
//! - Audio: PCM → WAV 纯编码逻辑

pub mod affiliate;
pub mod audio;
pub mod story;
