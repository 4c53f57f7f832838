use anyhow::Result;
use taskdeck::{cli, commands};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("taskdeck=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Cli::parse();
    let command = args.command.unwrap_or(cli::Command::Tui);
    match command {
        cli::Command::List { category } => commands::list(category),
        cli::Command::Add {
            title,
            deadline,
            priority,
            recurring,
            category,
        } => commands::add(title, deadline, priority, recurring, category),
        cli::Command::Toggle { task_id, category } => commands::toggle(task_id, category),
        cli::Command::Delete {
            task_id,
            category,
            yes,
        } => commands::delete(task_id, category, yes),
        cli::Command::Category { command } => match command {
            cli::CategoryCommand::List => commands::category_list(),
            cli::CategoryCommand::Add { name } => commands::category_add(name),
            cli::CategoryCommand::Rename { category_id, name } => {
                commands::category_rename(category_id, name)
            }
            cli::CategoryCommand::Delete { category_id, yes } => {
                commands::category_delete(category_id, yes)
            }
        },
        cli::Command::Theme { command } => match command {
            cli::ThemeCommand::Dark => commands::theme_dark(true),
            cli::ThemeCommand::Light => commands::theme_dark(false),
            cli::ThemeCommand::Background { id } => commands::theme_background(id),
            cli::ThemeCommand::List => commands::theme_list(),
        },
        cli::Command::Tui => commands::tui(),
    }
}
