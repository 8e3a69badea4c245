//! Query Handlers

pub mod media_handlers;

pub use media_handlers::{GetAudioHandler, GetImageHandler};
