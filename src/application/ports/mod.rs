//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod generation_gateway;
mod session_store;

pub use generation_gateway::{
    AspectRatio, ContentPart, GatewayError, GenerationGatewayPort, ImageRequest, InlineImage,
    SpeechReply, SpeechRequest, StructuredReply, StructuredRequest,
};
pub use session_store::{AudioArtifact, SessionError, SessionStorePort};
