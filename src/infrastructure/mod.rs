//! Infrastructure Layer - 适配器与技术实现

pub mod adapters;
pub mod events;
pub mod http;
pub mod memory;
