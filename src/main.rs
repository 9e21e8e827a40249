use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};
use eyre::{Context, Result};
use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use todostore::theme::{load_theme, toggle_theme};
use todostore::{
    Backend, Config, FileKvStore, FilterMode, KeyValueStore, SqliteKvStore, Task, TaskListStore, Theme,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "todostore")]
#[command(about = "A to-do list manager with persistent storage")]
#[command(version)]
struct Cli {
    /// Path to the config file (default: <config dir>/todostore/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the stored data
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Storage backend
    #[arg(short, long, value_enum)]
    backend: Option<Backend>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task to the top of the list
    Add {
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Mark a task done, or not done
    Toggle { id: i64 },

    /// Replace a task's text
    Edit {
        id: i64,
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Delete a task
    Delete { id: i64 },

    /// Delete all completed tasks
    ClearCompleted,

    /// Move a task next to another one
    Move {
        source: i64,
        target: i64,
        /// Place after the target instead of before it
        #[arg(long)]
        after: bool,
    },

    /// Show tasks
    List {
        #[arg(short, long, value_enum, default_value_t = FilterMode::All)]
        filter: FilterMode,
    },

    /// Print the number of incomplete tasks
    Count,

    /// Show or toggle the light/dark preference
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },
}

#[derive(Subcommand)]
enum ThemeAction {
    Show,
    Toggle,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }

    let mut kv = open_backend(&config)?;
    let theme = load_theme(&kv, &config.theme_key);

    let command = match cli.command {
        Commands::Theme { action } => {
            let theme = match action {
                Some(ThemeAction::Toggle) => toggle_theme(&mut kv, &config.theme_key),
                Some(ThemeAction::Show) | None => theme,
            };
            println!("{}", theme);
            return Ok(());
        }
        command => command,
    };

    let mut store = TaskListStore::with_key(kv, config.tasks_key.clone());
    let dirty = watch_changes(&mut store);

    if let Commands::Count = command {
        println!("{}", store.remaining_count());
        return Ok(());
    }

    dispatch(&mut store, command);

    // Redraw only when the store signalled a change
    if dirty.get() {
        render(&store, theme);
    }

    Ok(())
}

/// Flag raised whenever the store signals "list changed"
fn watch_changes<S: KeyValueStore>(store: &mut TaskListStore<S>) -> Rc<Cell<bool>> {
    let dirty = Rc::new(Cell::new(false));
    let flag = Rc::clone(&dirty);
    store.on_change(move |_| flag.set(true));
    dirty
}

/// Map one command onto one store operation
fn dispatch<S: KeyValueStore>(store: &mut TaskListStore<S>, command: Commands) {
    match command {
        Commands::Add { text } => {
            store.add(&text.join(" "));
        }
        Commands::Toggle { id } => {
            if !store.toggle_complete(id) {
                report_missing(id);
            }
        }
        Commands::Edit { id, text } => {
            if store.get(id).is_none() {
                report_missing(id);
            }
            store.edit(id, &text.join(" "));
        }
        Commands::Delete { id } => {
            if !store.delete(id) {
                report_missing(id);
            }
        }
        Commands::ClearCompleted => {
            store.clear_completed();
        }
        Commands::Move { source, target, after } => {
            if !store.move_task(source, target, after) {
                eprintln!("{}", format!("Cannot move task {} next to {}", source, target).yellow());
            }
        }
        Commands::List { filter } => store.set_filter(filter),
        Commands::Count | Commands::Theme { .. } => {}
    }
}

fn open_backend(config: &Config) -> Result<Box<dyn KeyValueStore>> {
    let kv: Box<dyn KeyValueStore> = match config.backend {
        Backend::File => Box::new(
            FileKvStore::open(&config.data_dir)
                .with_context(|| format!("Failed to open data directory {}", config.data_dir.display()))?,
        ),
        Backend::Sqlite => Box::new(
            SqliteKvStore::open(config.sqlite_path())
                .with_context(|| format!("Failed to open database {}", config.sqlite_path().display()))?,
        ),
    };
    Ok(kv)
}

fn report_missing(id: i64) {
    eprintln!("{}", format!("No task with id {}", id).yellow());
}

fn render<S: KeyValueStore>(store: &TaskListStore<S>, theme: Theme) {
    for task in store.visible_tasks() {
        println!("{}", render_task(task, theme));
    }

    let remaining = store.remaining_count();
    let suffix = if remaining == 1 { "" } else { "s" };
    println!("{}", format!("{} item{} left", remaining, suffix).dimmed());
}

fn render_task(task: &Task, theme: Theme) -> String {
    let (mark, text): (ColoredString, ColoredString) = if task.completed {
        ("[x]".green(), task.text.as_str().strikethrough().dimmed())
    } else {
        ("[ ]".normal(), task.text.as_str().normal())
    };
    let id = match theme {
        Theme::Light => task.id.to_string().blue(),
        Theme::Dark => task.id.to_string().bright_cyan(),
    };
    format!("{} {} {}", mark, id, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use todostore::MemoryKvStore;

    fn parse(args: &[&str]) -> Commands {
        let mut argv = vec!["todostore"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    fn watched_store() -> (TaskListStore<MemoryKvStore>, Rc<Cell<bool>>) {
        let mut store = TaskListStore::open(MemoryKvStore::new());
        let dirty = watch_changes(&mut store);
        (store, dirty)
    }

    #[test]
    fn test_add_joins_words_and_redraws() {
        let (mut store, dirty) = watched_store();

        dispatch(&mut store, parse(&["add", "buy", "milk"]));

        assert!(dirty.get());
        assert_eq!(store.len(), 1);
        assert_eq!(store.tasks()[0].text, "buy milk");
    }

    #[test]
    fn test_blank_add_does_not_redraw() {
        let (mut store, dirty) = watched_store();

        dispatch(&mut store, parse(&["add", "   "]));

        assert!(!dirty.get());
        assert!(store.is_empty());
    }

    #[test]
    fn test_unknown_toggle_does_not_redraw() {
        let (mut store, dirty) = watched_store();
        store.add("a");
        dirty.set(false);

        dispatch(&mut store, parse(&["toggle", "1"]));

        assert!(!dirty.get());
        assert_eq!(store.remaining_count(), 1);
    }

    #[test]
    fn test_toggle_and_clear_completed() {
        let (mut store, dirty) = watched_store();
        let id = store.add("a").unwrap();
        store.add("b");
        dirty.set(false);

        dispatch(&mut store, parse(&["toggle", id.to_string().as_str()]));
        assert!(dirty.get());
        assert!(store.get(id).unwrap().completed);

        dispatch(&mut store, parse(&["clear-completed"]));
        assert_eq!(store.len(), 1);
        assert!(store.get(id).is_none());
    }

    #[test]
    fn test_blank_edit_still_redraws() {
        let (mut store, dirty) = watched_store();
        let id = store.add("keep me").unwrap();
        dirty.set(false);

        dispatch(&mut store, parse(&["edit", id.to_string().as_str(), " "]));

        assert!(dirty.get());
        assert_eq!(store.get(id).unwrap().text, "keep me");
    }

    #[test]
    fn test_move_after_flag() {
        let (mut store, _dirty) = watched_store();
        let a = store.add("a").unwrap();
        let b = store.add("b").unwrap();
        // List order is [b, a]

        dispatch(&mut store, parse(&["move", b.to_string().as_str(), a.to_string().as_str(), "--after"]));

        let ids: Vec<i64> = store.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn test_list_sets_filter_and_redraws() {
        let (mut store, dirty) = watched_store();

        dispatch(&mut store, parse(&["list", "--filter", "completed"]));

        assert!(dirty.get());
        assert_eq!(store.filter(), FilterMode::Completed);
    }

    #[test]
    fn test_delete_unknown_id_leaves_list() {
        let (mut store, _dirty) = watched_store();
        store.add("a");

        dispatch(&mut store, parse(&["delete", "42"]));

        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_render_task_plain_text() {
        colored::control::set_override(false);

        let open = Task {
            id: 7,
            text: "write docs".to_string(),
            completed: false,
        };
        let done = Task {
            completed: true,
            ..open.clone()
        };

        assert_eq!(render_task(&open, Theme::Light), "[ ] 7 write docs");
        assert_eq!(render_task(&done, Theme::Dark), "[x] 7 write docs");
    }
}
