//! Task command handlers.
//!
//! These open the task document directly. Do not run them against a file
//! a running server owns: the server would overwrite the change on its
//! next save.

use super::ListFormat;
use anyhow::Context;
use taskboard::config::TaskboardConfig;
use taskboard::{JsonFileBackend, Task, TaskId, TaskStore, TaskTitle};

fn open_store(config: &TaskboardConfig) -> anyhow::Result<TaskStore> {
    let path = config.tasks_path();
    TaskStore::open(JsonFileBackend::new(&path))
        .with_context(|| format!("failed to open task store at {}", path.display()))
}

fn print_task(task: &Task) {
    let mark = if task.completed { "x" } else { " " };
    println!("[{mark}] {}  ({})", task.title, task.id);
}

/// List command.
pub fn cmd_list(config: &TaskboardConfig, format: ListFormat) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let tasks = store.list()?;

    match format {
        ListFormat::Json => println!("{}", serde_json::to_string_pretty(&tasks)?),
        ListFormat::Text if tasks.is_empty() => println!("No tasks."),
        ListFormat::Text => tasks.iter().for_each(print_task),
    }

    Ok(())
}

/// Add command.
pub fn cmd_add(config: &TaskboardConfig, title: &str) -> anyhow::Result<()> {
    let title = TaskTitle::parse(title)?;
    let store = open_store(config)?;
    let (task, meta) = store.add(title.as_str())?;

    println!("Task added:");
    println!("  ID: {}", task.id);
    println!("  Title: {}", task.title);
    println!("  Tasks: {}", meta.count);

    Ok(())
}

/// Complete command.
pub fn cmd_complete(config: &TaskboardConfig, id: &str, completed: bool) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let (task, _) = store.set_completed(&TaskId::new(id), completed)?;

    print_task(&task);
    Ok(())
}

/// Delete command.
pub fn cmd_delete(config: &TaskboardConfig, id: &str) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let meta = store.delete(&TaskId::new(id))?;

    println!("Task deleted ({} remaining)", meta.count);
    Ok(())
}
