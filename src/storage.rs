use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::models::Task;

/// Returns the path to the tasks database file (`tasks.json`).
///
/// The path is determined in the following order:
/// 1. `REPETE_DB` environment variable.
/// 2. `~/.local/share/repete/tasks.json` (on Linux).
/// 3. `./tasks.json` (fallback).
pub fn db_path() -> PathBuf {
    std::env::var("REPETE_DB").map(PathBuf::from).unwrap_or_else(|_| {
        let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("repete");
        p.push("tasks.json");
        p
    })
}

/// Returns the path to the templates file (`templates.json`).
///
/// Located in the same directory as the tasks database.
pub fn templates_path() -> PathBuf {
    let mut p = db_path();
    p.pop();
    p.push("templates.json");
    p
}

fn load_from<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut f = OpenOptions::new().read(true).open(path)?;
    let mut s = String::new();
    f.read_to_string(&mut s)?;
    if s.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(&s)?)
}

fn save_to<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    let s = serde_json::to_string_pretty(items)?;
    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    f.write_all(s.as_bytes())?;
    info!(path = %path.display(), count = items.len(), "saved");
    Ok(())
}

/// Loads all tasks. A missing database is an empty one.
pub fn load_tasks() -> Result<Vec<Task>> {
    load_from(&db_path())
}

/// Saves the given list of tasks, overwriting the existing file.
pub fn save_tasks(tasks: &[Task]) -> Result<()> {
    save_to(&db_path(), tasks)
}

/// Loads a single task by name.
pub fn load_task(name: &str) -> Result<Option<Task>> {
    Ok(load_tasks()?.into_iter().find(|t| t.name() == name))
}

/// Loads all template tasks.
pub fn load_templates() -> Result<Vec<Task>> {
    load_from(&templates_path())
}

pub fn save_templates(templates: &[Task]) -> Result<()> {
    save_to(&templates_path(), templates)
}

pub fn load_template(name: &str) -> Result<Option<Task>> {
    Ok(load_templates()?.into_iter().find(|t| t.name() == name))
}

/// Deletes the tasks and templates files.
pub fn delete_database() -> Result<()> {
    for path in [db_path(), templates_path()] {
        if path.exists() {
            fs::remove_file(path)?;
        }
    }
    Ok(())
}
