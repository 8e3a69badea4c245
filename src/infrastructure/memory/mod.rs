//! In-Memory Implementations - 会话产物区的内存实现

pub mod session_store;

pub use session_store::InMemorySessionStore;
