// Task list store with write-through persistence

use crate::error::{Result, StoreError};
use crate::filter::FilterMode;
use crate::kv::KeyValueStore;
use crate::task::{Task, normalize_text};
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

/// Default storage key for the serialized task list
pub const DEFAULT_TASKS_KEY: &str = "todos";

/// State handed to change listeners after every "list changed" signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListSnapshot {
    pub revision: u64,
    pub remaining: usize,
    pub filter: FilterMode,
}

type Listener = Box<dyn FnMut(&ListSnapshot)>;

/// Ordered task list, loaded once from a key-value store and written back
/// after every mutation
///
/// New tasks go to the front. Ids are unique and task text is never empty.
/// Persistence failures are logged and never abort the in-memory change.
pub struct TaskListStore<S: KeyValueStore> {
    kv: S,
    key: String,
    tasks: Vec<Task>,
    filter: FilterMode,
    revision: u64,
    listeners: Vec<Listener>,
}

impl<S: KeyValueStore> TaskListStore<S> {
    /// Open a store over `kv` using the default tasks key
    pub fn open(kv: S) -> Self {
        Self::with_key(kv, DEFAULT_TASKS_KEY)
    }

    /// Open a store over `kv`, reading and writing tasks under `key`
    pub fn with_key(kv: S, key: impl Into<String>) -> Self {
        let mut store = Self {
            kv,
            key: key.into(),
            tasks: Vec::new(),
            filter: FilterMode::All,
            revision: 0,
            listeners: Vec::new(),
        };
        store.tasks = store.load();
        info!(key = %store.key, count = store.tasks.len(), "Loaded task list");
        store
    }

    /// Get a reference to the underlying key-value store
    pub fn kv(&self) -> &S {
        &self.kv
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Read the persisted task list
    ///
    /// Missing or malformed data yields an empty list. Entries with blank
    /// text are skipped. An entry reusing an id already taken is kept under
    /// a fresh id.
    pub fn load(&self) -> Vec<Task> {
        let raw = match self.try_load() {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to load tasks, starting empty");
                return Vec::new();
            }
        };

        // Reserve every stored id up front so a bumped id never lands on a
        // later entry's id
        let mut taken: HashSet<i64> = raw.iter().map(|t| t.id).collect();
        let mut seen = HashSet::new();
        raw.into_iter()
            .filter_map(|mut task| {
                if task.text.trim().is_empty() {
                    warn!(id = task.id, "Skipping stored task with empty text");
                    return None;
                }
                if !seen.insert(task.id) {
                    let original = task.id;
                    while taken.contains(&task.id) {
                        task.id += 1;
                    }
                    taken.insert(task.id);
                    seen.insert(task.id);
                    warn!(original, id = task.id, "Stored task had a duplicate id, assigned a new one");
                }
                Some(task)
            })
            .collect()
    }

    fn try_load(&self) -> Result<Vec<Task>> {
        let Some(json) = self.kv.get(&self.key)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&json).map_err(|source| StoreError::LoadParse {
            key: self.key.clone(),
            source,
        })
    }

    /// Serialize and write the full task list
    ///
    /// A failed write is logged; memory and disk may diverge until the next
    /// successful save.
    pub fn save(&mut self, tasks: &[Task]) {
        write_tasks(&mut self.kv, &self.key, tasks);
    }

    fn persist(&mut self) {
        write_tasks(&mut self.kv, &self.key, &self.tasks);
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Prepend a task with the given text
    ///
    /// Returns the new id, or `None` when the trimmed text is empty.
    pub fn add(&mut self, text: &str) -> Option<i64> {
        let mut task = Task::new(text)?;
        while self.get(task.id).is_some() {
            debug!(id = task.id, "Task id collision, bumping");
            task.id += 1;
        }

        let id = task.id;
        self.tasks.insert(0, task);
        self.persist();
        self.notify();
        Some(id)
    }

    /// Flip the completion flag of the first task with `id`
    pub fn toggle_complete(&mut self, id: i64) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        task.completed = !task.completed;

        self.persist();
        self.notify();
        true
    }

    /// Remove every task with `id`
    pub fn delete(&mut self, id: i64) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = self.tasks.len() != before;

        self.persist();
        self.notify();
        removed
    }

    /// Replace a task's text
    ///
    /// Blank text or an unknown id leave the list untouched, but the change
    /// signal still fires so a view can redraw over a cancelled edit.
    pub fn edit(&mut self, id: i64, new_text: &str) -> bool {
        let applied = match (normalize_text(new_text), self.tasks.iter_mut().find(|t| t.id == id)) {
            (Some(text), Some(task)) => {
                task.text = text;
                true
            }
            _ => false,
        };

        if applied {
            self.persist();
        }
        self.notify();
        applied
    }

    /// Remove all completed tasks, returning how many were removed
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        let removed = before - self.tasks.len();

        self.persist();
        self.notify();
        removed
    }

    /// Move `source_id` to sit directly before or after `target_id`
    pub fn move_task(&mut self, source_id: i64, target_id: i64, insert_after_target: bool) -> bool {
        if source_id == target_id {
            return false;
        }
        let (Some(from), Some(target)) = (self.position(source_id), self.position(target_id)) else {
            return false;
        };

        let task = self.tasks.remove(from);
        // Target shifts left once the source is out of the list
        let target = if target > from { target - 1 } else { target };
        let to = if insert_after_target { target + 1 } else { target };
        self.tasks.insert(to, task);

        debug!(source_id, target_id, from, to, "Moved task");
        self.persist();
        self.notify();
        true
    }

    /// Change which tasks `visible_tasks` yields
    pub fn set_filter(&mut self, mode: FilterMode) {
        self.filter = mode;
        self.notify();
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Tasks passing the current filter, in list order
    pub fn visible_tasks(&self) -> impl Iterator<Item = &Task> + '_ {
        let filter = self.filter;
        self.tasks.iter().filter(move |t| filter.matches(t))
    }

    /// Number of incomplete tasks
    pub fn remaining_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.completed).count()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    /// Number of "list changed" signals emitted so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Register a callback run after every "list changed" signal
    pub fn on_change(&mut self, listener: impl FnMut(&ListSnapshot) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn position(&self, id: i64) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    fn notify(&mut self) {
        self.revision += 1;
        let snapshot = ListSnapshot {
            revision: self.revision,
            remaining: self.remaining_count(),
            filter: self.filter,
        };
        for listener in self.listeners.iter_mut() {
            listener(&snapshot);
        }
    }
}

fn write_tasks<S: KeyValueStore>(kv: &mut S, key: &str, tasks: &[Task]) {
    let result = serde_json::to_string(tasks)
        .map_err(StoreError::from)
        .and_then(|json| kv.set(key, &json));

    match result {
        Ok(()) => debug!(key, count = tasks.len(), "Saved task list"),
        Err(e) => error!(key, count = tasks.len(), error = %e, "Failed to save task list"),
    }
}
