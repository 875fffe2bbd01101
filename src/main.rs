//! # Repete
//!
//! A terminal reminder tool for recurring chores. Each task repeats on an
//! interval; it can wait for you to mark it done before counting down again,
//! snap its due time to the start of a day/week/month, and turn urgent when
//! left undone for too long.
//!
//! ## Usage
//!
//! ```bash
//! # Water the plants every 3 days, due at the start of the day
//! repete add "Water plants" --every 3d --snap day
//!
//! # Standup every weekday morning on a fixed cadence, urgent after 15 minutes
//! repete add "Standup" --every 1d --fixed --urgent-after 15min --alarm
//!
//! # What is due right now?
//! repete check
//!
//! # Done!
//! repete done "Water plants"
//! ```
//!
//! ## Data Storage
//!
//! Tasks are saved in your local data directory (`~/.local/share/repete/tasks.json`
//! on Linux). Override with the `REPETE_DB` environment variable. Logging is
//! controlled with `RUST_LOG`.

use std::io;
use std::process::ExitCode;

use chrono::Local;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::EnvFilter;

use repete::commands::*;
use repete::{Error, Interval, Result, TimeUnit};

#[derive(Parser)]
#[command(name = "repete")]
#[command(about = "Recurring reminders that know when they are due", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct SettingsArgs {
    /// Repeat interval, e.g. 3d, 12h, 1w, 1mo
    #[arg(short, long)]
    every: Option<Interval>,
    /// Longer description
    #[arg(short, long)]
    description: Option<String>,
    /// Snap due times to the start of this unit (minute, hour, day, week, month)
    #[arg(short, long, conflicts_with = "no_snap")]
    snap: Option<TimeUnit>,
    /// Stop snapping due times
    #[arg(long)]
    no_snap: bool,
    /// Become urgent this long after falling due, e.g. 2h
    #[arg(short, long, conflicts_with = "no_urgency")]
    urgent_after: Option<Interval>,
    /// Never become urgent
    #[arg(long)]
    no_urgency: bool,
    /// Recur on a fixed cadence instead of counting down from completion
    #[arg(long, conflicts_with = "after_done")]
    fixed: bool,
    /// Count down to the next due time only once marked done
    #[arg(long)]
    after_done: bool,
    /// Create notifications when due
    #[arg(long, conflicts_with = "no_notify")]
    notify: bool,
    /// Do not create notifications
    #[arg(long)]
    no_notify: bool,
    /// Play an audio alarm when due
    #[arg(long, conflicts_with = "no_alarm")]
    alarm: bool,
    /// Do not play an audio alarm
    #[arg(long)]
    no_alarm: bool,
}

fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

impl From<SettingsArgs> for TaskSettings {
    fn from(a: SettingsArgs) -> Self {
        TaskSettings {
            every: a.every,
            description: a.description,
            snap: a.snap,
            no_snap: a.no_snap,
            urgent_after: a.urgent_after,
            no_urgency: a.no_urgency,
            fixed_cadence: flag_pair(a.fixed, a.after_done),
            notify: flag_pair(a.notify, a.no_notify),
            alarm: flag_pair(a.alarm, a.no_alarm),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task name (quoted if it has spaces)
        name: String,
        /// Copy settings from a template
        #[arg(short, long)]
        template: Option<String>,
        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// List tasks, soonest due first
    List {
        /// Only show tasks that are due or urgent
        #[arg(long)]
        due: bool,
    },
    /// Show what is due now (for notifiers and cron jobs)
    Check,
    /// Mark a task as done
    Done { name: String },
    /// Mark a task as not done
    Undone { name: String },
    /// Remove a task
    Remove { name: String },
    /// Edit a task
    Edit {
        name: String,
        /// New task name
        #[arg(short, long)]
        rename: Option<String>,
        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Manage templates
    Template {
        #[command(subcommand)]
        command: TemplateCommands,
    },
    /// Reset the database (delete all tasks and templates)
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum TemplateCommands {
    /// Add a new template
    Add {
        /// Template name
        name: String,
        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// List templates
    List,
    /// Remove a template
    Remove {
        /// Template name
        name: String,
    },
}

fn run(command: Commands) -> Result<()> {
    let now = Local::now().naive_local();
    match command {
        Commands::Add { name, template, settings } => cmd_add(name, settings.into(), template, now, false),
        Commands::List { due } => cmd_list(now, due, false).map(|_| ()),
        Commands::Check => cmd_check(now, false).map(|_| ()),
        Commands::Done { name } => cmd_done(&name, now, false),
        Commands::Undone { name } => cmd_undone(&name, false),
        Commands::Remove { name } => cmd_remove(&name, false),
        Commands::Edit { name, rename, settings } => cmd_edit(&name, rename, settings.into(), false),
        Commands::Template { command } => match command {
            TemplateCommands::Add { name, settings } => {
                let settings: TaskSettings = settings.into();
                let every = settings.every.ok_or_else(|| {
                    Error::InvalidConfiguration("a template needs an interval (--every)".into())
                })?;
                cmd_template_add(name, every, settings, now, false)
            }
            TemplateCommands::List => cmd_template_list(false).map(|_| ()),
            TemplateCommands::Remove { name } => cmd_template_remove(&name, false),
        },
        Commands::Reset { force } => cmd_reset(force),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "repete", &mut io::stdout());
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::List { due: false });
    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
