//! HTTP Handlers

pub mod affiliate;
pub mod media;
pub mod ping;
pub mod session;
pub mod story;
pub mod websocket;

pub use affiliate::generate_affiliate;
pub use media::{get_audio, get_image};
pub use ping::ping;
pub use session::{
    change_scene_voice, close_session, open_session, play_scene_audio, playback_done,
};
pub use story::{generate_story, visualize_scene, visualize_story};
pub use websocket::websocket_handler;
