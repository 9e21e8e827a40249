// todostore - to-do list with write-through key-value persistence

pub mod config;
pub mod error;
pub mod filter;
pub mod kv;
pub mod store;
pub mod task;
pub mod theme;

// Re-export main types for convenience
pub use config::{Backend, Config};
pub use error::StoreError;
pub use filter::FilterMode;
pub use kv::{FileKvStore, KeyValueStore, MemoryKvStore, SqliteKvStore};
pub use store::{ListSnapshot, TaskListStore};
pub use task::{Task, now_ms};
pub use theme::Theme;
