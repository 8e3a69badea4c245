//! Application Layer - 应用层
//!
//! - Ports: 出站端口（GenerationGateway, SessionStore）
//! - Commands: CQRS 命令与处理器（两条生成管线 + 会话音频）
//! - Queries: CQRS 查询与处理器（产物读取）
//! - Batch: 顺序批处理原语

pub mod batch;
pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

pub use batch::{run_batch, BatchFailure, BatchOutcome};
pub use commands::*;
pub use error::ApplicationError;
pub use ports::*;
pub use queries::*;
