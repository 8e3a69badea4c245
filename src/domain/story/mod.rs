//! Story Context - 故事脚本限界上下文
//!
//! 职责:
//! - 故事生成请求与脚本聚合
//! - 结构化提示词（六字段电影化描述）
//! - N+1 溯源场景不变量校验

mod aggregate;
mod errors;
mod value_objects;

pub use aggregate::{Scene, StoryRequest, StoryScript};
pub use errors::StoryError;
pub use value_objects::{StructuredPrompt, Tone, SOURCE_VERIFICATION_TONE};
