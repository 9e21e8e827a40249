// Task record and id generation

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One to-do entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    /// Build a task from raw input text
    ///
    /// Returns `None` when the text is empty after trimming.
    pub fn new(text: &str) -> Option<Self> {
        let text = normalize_text(text)?;
        Some(Self {
            id: new_task_id(),
            text,
            completed: false,
        })
    }
}

/// Trim input text, rejecting empty or whitespace-only values
pub fn normalize_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Current timestamp in milliseconds since the Unix epoch
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Fresh task id: the creation millisecond scaled by 1000 plus a random
/// disambiguator in `0..1000`.
///
/// Ids stay below 2^53 so they survive a round trip through any JSON reader.
/// Two ids minted in the same millisecond can still collide; the store
/// resolves that on insert.
pub fn new_task_id() -> i64 {
    // The low 62 bits of a v7 uuid are random, so they stand in for an RNG
    let disambiguator = (Uuid::now_v7().as_u128() % 1000) as i64;
    now_ms() * 1000 + disambiguator
}
