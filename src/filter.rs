// Display filter for the task list

use crate::task::Task;

/// Which tasks the list view shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum FilterMode {
    #[default]
    All,
    /// Incomplete tasks only
    Active,
    Completed,
}

impl FilterMode {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Active => !task.completed,
            FilterMode::Completed => task.completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FilterMode::All => "all",
            FilterMode::Active => "active",
            FilterMode::Completed => "completed",
        }
    }
}

impl std::fmt::Display for FilterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(completed: bool) -> Task {
        Task {
            id: 1,
            text: "t".to_string(),
            completed,
        }
    }

    #[test]
    fn test_filter_matches() {
        assert!(FilterMode::All.matches(&task(true)));
        assert!(FilterMode::All.matches(&task(false)));
        assert!(FilterMode::Active.matches(&task(false)));
        assert!(!FilterMode::Active.matches(&task(true)));
        assert!(FilterMode::Completed.matches(&task(true)));
        assert!(!FilterMode::Completed.matches(&task(false)));
    }

    #[test]
    fn test_filter_default_is_all() {
        assert_eq!(FilterMode::default(), FilterMode::All);
    }

    #[test]
    fn test_filter_display() {
        assert_eq!(FilterMode::All.to_string(), "all");
        assert_eq!(FilterMode::Active.to_string(), "active");
    }
}
