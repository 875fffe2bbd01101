use std::io::{self, Write};

use chrono::NaiveDateTime;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use tracing::debug;

use crate::error::{Error, Result};
use crate::interval::{Interval, TimeUnit};
use crate::models::Task;
use crate::storage::{delete_database, load_tasks, load_template, load_templates, save_tasks, save_templates};
use crate::urgency::{
    compute_due_instant, should_create_notification, should_play_audio_alarm, status, urgent_instant,
    TaskStatus,
};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Optional settings shared by `add`, `edit` and `template add`.
/// `None` leaves the corresponding field as it is.
#[derive(Debug, Default, Clone)]
pub struct TaskSettings {
    pub every: Option<Interval>,
    pub description: Option<String>,
    pub snap: Option<TimeUnit>,
    pub no_snap: bool,
    pub urgent_after: Option<Interval>,
    pub no_urgency: bool,
    pub fixed_cadence: Option<bool>,
    pub notify: Option<bool>,
    pub alarm: Option<bool>,
}

impl TaskSettings {
    pub fn apply(&self, task: &mut Task) -> Result<()> {
        if let Some(every) = self.every {
            task.set_interval(every.magnitude(), every.unit())?;
        }
        if let Some(d) = &self.description {
            task.set_description(d.clone());
        }
        if self.no_snap {
            task.do_not_snap();
        } else if let Some(unit) = self.snap {
            task.snap_to(unit);
        }
        if self.no_urgency {
            task.clear_urgency();
        } else if let Some(u) = self.urgent_after {
            task.set_urgency(u.magnitude(), u.unit())?;
        }
        if let Some(fixed) = self.fixed_cadence {
            task.set_only_repeats_once_done(!fixed);
        }
        if let Some(n) = self.notify {
            task.set_create_notification(n);
        }
        if let Some(a) = self.alarm {
            task.set_audio_alarm(a);
        }
        Ok(())
    }
}

/// A due task as reported to a notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub name: String,
    pub status: TaskStatus,
    pub notify: bool,
    pub alarm: bool,
}

fn find_mut<'a>(tasks: &'a mut [Task], name: &str) -> Result<&'a mut Task> {
    tasks
        .iter_mut()
        .find(|t| t.name() == name)
        .ok_or_else(|| Error::TaskNotFound(name.to_string()))
}

/// Adds a new task.
///
/// With `template_name` the task starts from the template's settings; any
/// settings given explicitly override them.
pub fn cmd_add(name: String, settings: TaskSettings, template_name: Option<String>, now: NaiveDateTime, silent: bool) -> Result<()> {
    let mut tasks = load_tasks()?;
    if tasks.iter().any(|t| t.name() == name) {
        return Err(Error::DuplicateName(name));
    }

    let mut task = match &template_name {
        Some(t_name) => {
            let tmpl = load_template(t_name)?.ok_or_else(|| Error::TemplateNotFound(t_name.clone()))?;
            Task::from_template(name.clone(), &tmpl, now)?
        }
        None => {
            let every = settings
                .every
                .ok_or_else(|| Error::invalid("an interval (--every) is required when no template is given"))?;
            Task::new(name.clone(), every.magnitude(), every.unit(), now)?
        }
    };
    settings.apply(&mut task)?;

    let due = compute_due_instant(&task)?;
    tasks.push(task);
    save_tasks(&tasks)?;
    if !silent {
        println!("Task '{}' added, first due {}", name, due.format(TIME_FORMAT));
    }
    Ok(())
}

/// Marks a task done. Tasks that repeat once done move straight to their
/// next cycle.
pub fn cmd_done(name: &str, now: NaiveDateTime, silent: bool) -> Result<()> {
    let mut tasks = load_tasks()?;
    let task = find_mut(&mut tasks, name)?;
    task.roll_forward(now)?;
    task.mark_done(now)?;
    let next = compute_due_instant(task)?;
    let repeats_once_done = task.is_only_repeats_once_done();
    save_tasks(&tasks)?;
    if !silent {
        if repeats_once_done {
            println!("Task '{}' done. Next due {}", name, next.format(TIME_FORMAT));
        } else {
            println!("Task '{}' done for this cycle.", name);
        }
    }
    Ok(())
}

pub fn cmd_undone(name: &str, silent: bool) -> Result<()> {
    let mut tasks = load_tasks()?;
    find_mut(&mut tasks, name)?.mark_not_done()?;
    save_tasks(&tasks)?;
    if !silent {
        println!("Task '{}' marked as not done.", name);
    }
    Ok(())
}

/// Removes a task from the database by name.
pub fn cmd_remove(name: &str, silent: bool) -> Result<()> {
    let mut tasks = load_tasks()?;
    let len_before = tasks.len();
    tasks.retain(|t| t.name() != name);
    if tasks.len() == len_before {
        return Err(Error::TaskNotFound(name.to_string()));
    }
    save_tasks(&tasks)?;
    if !silent {
        println!("Task '{}' removed.", name);
    }
    Ok(())
}

/// Edits an existing task's name or settings.
pub fn cmd_edit(name: &str, new_name: Option<String>, settings: TaskSettings, silent: bool) -> Result<()> {
    let mut tasks = load_tasks()?;
    if let Some(n) = &new_name {
        if n != name && tasks.iter().any(|t| t.name() == n) {
            return Err(Error::DuplicateName(n.clone()));
        }
    }
    let task = find_mut(&mut tasks, name)?;
    // apply to a copy so a rejected setting leaves the stored task intact
    let mut edited = task.clone();
    if let Some(n) = new_name {
        edited.set_name(n)?;
    }
    settings.apply(&mut edited)?;
    *task = edited;
    save_tasks(&tasks)?;
    if !silent {
        println!("Task '{}' updated.", name);
    }
    Ok(())
}

/// Loads all tasks with fixed cadences rolled forward to `now` in memory.
/// The flag reports whether any task entered a new cycle.
pub fn load_current_tasks(now: NaiveDateTime) -> Result<(Vec<Task>, bool)> {
    let mut tasks = load_tasks()?;
    let mut rolled = false;
    for t in tasks.iter_mut() {
        rolled |= t.roll_forward(now)?;
    }
    Ok((tasks, rolled))
}

/// Polls every task the way a notifier would.
///
/// Fixed-cadence tasks are rolled forward to `now` first (and saved if any
/// moved). Returns the tasks that are due or urgent.
pub fn cmd_check(now: NaiveDateTime, silent: bool) -> Result<Vec<Reminder>> {
    let (tasks, rolled) = load_current_tasks(now)?;
    if rolled {
        save_tasks(&tasks)?;
    }

    let reminders: Vec<Reminder> = tasks
        .iter()
        .filter_map(|t| {
            let st = status(t, now);
            matches!(st, TaskStatus::Due | TaskStatus::Urgent).then(|| Reminder {
                name: t.name().to_string(),
                status: st,
                notify: should_create_notification(t, now),
                alarm: should_play_audio_alarm(t, now),
            })
        })
        .collect();
    debug!(checked = tasks.len(), due = reminders.len(), "check finished");

    if !silent {
        if reminders.is_empty() {
            println!("Nothing due.");
        }
        for r in &reminders {
            let label = if r.status == TaskStatus::Urgent { "URGENT" } else { "due" };
            let mut actions = Vec::new();
            if r.notify {
                actions.push("notify");
            }
            if r.alarm {
                actions.push("alarm");
            }
            println!("[{}] {} {}", label, r.name, actions.join(","));
        }
    }
    Ok(reminders)
}

/// Lists tasks in a formatted table, soonest due first.
///
/// With `due_only`, only tasks that are due or urgent at `now` are shown.
/// Fixed cadences are rolled forward for display only; nothing is saved.
/// Returns the listed tasks in display order.
pub fn cmd_list(now: NaiveDateTime, due_only: bool, silent: bool) -> Result<Vec<Task>> {
    let (mut tasks, _) = load_current_tasks(now)?;
    if due_only {
        tasks.retain(|t| matches!(status(t, now), TaskStatus::Due | TaskStatus::Urgent));
    }
    if tasks.is_empty() {
        if !silent {
            println!("No tasks found.");
        }
        return Ok(tasks);
    }
    tasks.sort_by_key(|t| compute_due_instant(t).ok());

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Every").add_attribute(Attribute::Bold),
            Cell::new("Mode").add_attribute(Attribute::Bold),
            Cell::new("Snap").add_attribute(Attribute::Bold),
            Cell::new("Due").add_attribute(Attribute::Bold),
            Cell::new("Urgent At").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    for t in &tasks {
        let due = compute_due_instant(t)
            .map(|d| d.format(TIME_FORMAT).to_string())
            .unwrap_or_else(|_| "-".into());
        let urgent_at = match urgent_instant(t) {
            Ok(Some(u)) => u.format(TIME_FORMAT).to_string(),
            _ => "-".into(),
        };
        let mode = if t.is_only_repeats_once_done() { "after done" } else { "fixed" };
        let (status_text, status_color) = match status(t, now) {
            TaskStatus::Upcoming => ("Upcoming", Color::Green),
            TaskStatus::Due => ("Due", Color::Yellow),
            TaskStatus::Urgent => ("Urgent", Color::Red),
            TaskStatus::Done => ("Done", Color::Grey),
        };

        table.add_row(vec![
            Cell::new(t.name()),
            Cell::new(t.interval()),
            Cell::new(mode),
            Cell::new(t.snap_unit().map(|u| u.to_string()).unwrap_or_else(|| "-".into())),
            Cell::new(due),
            Cell::new(urgent_at),
            Cell::new(status_text).fg(status_color),
        ]);
    }

    if !silent {
        println!("{table}");
    }
    Ok(tasks)
}

/// Adds a template task that new tasks can copy their settings from.
pub fn cmd_template_add(name: String, every: Interval, settings: TaskSettings, now: NaiveDateTime, silent: bool) -> Result<()> {
    let mut templates = load_templates()?;
    if templates.iter().any(|t| t.name() == name) {
        return Err(Error::DuplicateName(name));
    }
    let mut template = Task::new(name.clone(), every.magnitude(), every.unit(), now)?;
    settings.apply(&mut template)?;
    templates.push(template);
    save_templates(&templates)?;
    if !silent {
        println!("Template '{}' added.", name);
    }
    Ok(())
}

/// Lists all available templates.
pub fn cmd_template_list(silent: bool) -> Result<Vec<Task>> {
    let templates = load_templates()?;
    if templates.is_empty() {
        if !silent {
            println!("No templates found.");
        }
        return Ok(templates);
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Name", "Every", "Mode", "Snap", "Urgent After", "Notify", "Alarm"]);
    for t in &templates {
        table.add_row(vec![
            t.name().to_string(),
            t.interval().to_string(),
            if t.is_only_repeats_once_done() { "after done".into() } else { "fixed".into() },
            t.snap_unit().map(|u| u.to_string()).unwrap_or_else(|| "-".into()),
            t.urgency().map(|u| u.to_string()).unwrap_or_else(|| "-".into()),
            if t.should_create_notification() { "yes".into() } else { "no".into() },
            if t.should_play_audio_alarm() { "yes".into() } else { "no".into() },
        ]);
    }
    if !silent {
        println!("{table}");
    }
    Ok(templates)
}

pub fn cmd_template_remove(name: &str, silent: bool) -> Result<()> {
    let mut templates = load_templates()?;
    let len_before = templates.len();
    templates.retain(|t| t.name() != name);
    if templates.len() == len_before {
        return Err(Error::TemplateNotFound(name.to_string()));
    }
    save_templates(&templates)?;
    if !silent {
        println!("Template '{}' removed.", name);
    }
    Ok(())
}

/// Resets the database by deleting all tasks and templates.
pub fn cmd_reset(force: bool) -> Result<()> {
    if !force {
        print!("Are you sure you want to delete all tasks and templates? This cannot be undone. [y/N] ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if input.trim().to_lowercase() != "y" {
            println!("Aborted.");
            return Ok(());
        }
    }
    delete_database()?;
    println!("Database reset successfully.");
    Ok(())
}
