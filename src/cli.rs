use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "taskdeck", version, about = "Terminal personal task planner")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List categories and their tasks
    List {
        /// Show only this category id
        #[arg(long)]
        category: Option<String>,
    },
    /// Add a new task
    Add {
        /// Title of the task
        title: String,
        /// Deadline in YYYY-MM-DD format
        #[arg(long)]
        deadline: String,
        /// Priority: high, medium or low
        #[arg(long, default_value = "medium")]
        priority: String,
        /// Recurrence: none, daily, weekly or monthly
        #[arg(long, default_value = "none")]
        recurring: String,
        /// Category id to add to (defaults to the first category)
        #[arg(long)]
        category: Option<String>,
    },
    /// Toggle a task between pending and done
    Toggle {
        /// Task id to toggle
        task_id: String,
        /// Category id holding the task (found by search if omitted)
        #[arg(long)]
        category: Option<String>,
    },
    /// Delete a task
    Delete {
        /// Task id to delete
        task_id: String,
        /// Category id holding the task (found by search if omitted)
        #[arg(long)]
        category: Option<String>,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Manage categories
    Category {
        #[command(subcommand)]
        command: CategoryCommand,
    },
    /// Dark mode and background theme settings
    Theme {
        #[command(subcommand)]
        command: ThemeCommand,
    },
    /// Launch the interactive TUI
    Tui,
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    /// List all categories with task counts
    List,
    /// Add a new category
    Add {
        /// Display name of the category
        name: String,
    },
    /// Rename a category (built-ins included)
    Rename {
        /// Category id to rename
        category_id: String,
        /// New display name
        name: String,
    },
    /// Delete a category and all of its tasks
    Delete {
        /// Category id to delete
        category_id: String,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ThemeCommand {
    /// Enable dark mode
    Dark,
    /// Disable dark mode
    Light,
    /// Select the background theme
    Background {
        /// Theme identifier, e.g. gradient-purple
        id: String,
    },
    /// List the available background themes
    List,
}
