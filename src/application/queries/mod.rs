//! Application Queries - CQRS 查询定义与处理器

pub mod handlers;
pub mod media_queries;

pub use handlers::{GetAudioHandler, GetImageHandler};
pub use media_queries::{GetAudioQuery, GetImageQuery};
