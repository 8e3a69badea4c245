//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::{GatewayError, SessionError};
use crate::domain::affiliate::AffiliateError;
use crate::domain::audio::PcmError;
use crate::domain::story::StoryError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 生成端违反结构契约（N+1、哨兵基调、label 唯一性等）
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    /// 状态无效
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// 外部服务错误
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建契约违反错误
    pub fn contract(message: impl Into<String>) -> Self {
        Self::ContractViolation(message.into())
    }

    /// 创建状态无效错误
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<GatewayError> for ApplicationError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::EmptyResponse
            | GatewayError::SchemaViolation(_)
            | GatewayError::NoImageReturned
            | GatewayError::NoAudioReturned => Self::ContractViolation(err.to_string()),
            GatewayError::Transport(_) | GatewayError::Timeout | GatewayError::Service(_) => {
                Self::ExternalServiceError(err.to_string())
            }
        }
    }
}

impl From<SessionError> for ApplicationError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(id) => Self::not_found("Session", id),
        }
    }
}

impl From<StoryError> for ApplicationError {
    fn from(err: StoryError) -> Self {
        match err {
            StoryError::InvalidTitle(_) | StoryError::InvalidSceneCount(_) => {
                Self::ValidationError(err.to_string())
            }
            _ => Self::ContractViolation(err.to_string()),
        }
    }
}

impl From<AffiliateError> for ApplicationError {
    fn from(err: AffiliateError) -> Self {
        match err {
            AffiliateError::InvalidProductName(_) | AffiliateError::InvalidSceneCount(_) => {
                Self::ValidationError(err.to_string())
            }
            _ => Self::ContractViolation(err.to_string()),
        }
    }
}

impl From<PcmError> for ApplicationError {
    fn from(err: PcmError) -> Self {
        Self::ContractViolation(err.to_string())
    }
}
