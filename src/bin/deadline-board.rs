use std::error::Error;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use deadline_board::client::Client;
use deadline_board::config::Settings;
use deadline_board::deadlines::{DeadlineIndex, DATE_FORMAT};
use deadline_board::store::FileStore;
use deadline_board::streak::{Challenge, StreakTracker};
use deadline_board::{theme, utils, Board, TaskId};

#[derive(Parser)]
#[command(name = "deadline-board", about = "A to-do list with local deadlines", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every task, with its deadline
    List,
    /// Create a task
    Add {
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Mark a task as completed
    Done { id: String },
    /// Mark a task as pending again
    Undo { id: String },
    /// Delete a task (and its deadline)
    Delete { id: String },
    /// Set the deadline of a task (YYYY-MM-DD)
    Due { id: String, date: String },
    /// Remove the deadline of a task
    Clear { id: String },
    /// List the tasks due on a day (YYYY-MM-DD, today by default)
    On { date: Option<String> },
    /// Show every date that has deadlines, with its marker color
    Calendar,
    /// Delete every local deadline
    ResetDeadlines,
    /// Show the current theme, or pick another one
    Theme { name: Option<String> },
    /// Show today's challenge and the current streak
    Streak {
        /// Mark today's challenge as done
        #[arg(long)]
        complete: bool,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(err) = run(cli.command).await {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<(), Box<dyn Error>> {
    let settings = Settings::from_env()?;
    let store = FileStore::new(&settings.data_dir);
    let today = Local::now().date_naive();

    // Commands that only need local data
    match &command {
        Commands::Due { id, date } => {
            let index = local_index(&store, &settings);
            index.assign(&TaskId::from(id.as_str()), parse_date(date)?).await;
            return check_saved(&index).await;
        },
        Commands::Clear { id } => {
            let index = local_index(&store, &settings);
            index.clear(&TaskId::from(id.as_str())).await;
            return check_saved(&index).await;
        },
        Commands::ResetDeadlines => {
            let index = local_index(&store, &settings);
            index.reset().await;
            return check_saved(&index).await;
        },
        Commands::Theme { name } => {
            let current = match name {
                Some(name) => {
                    let state = theme::load_theme(&store).await.apply(theme::ThemeAction::SetTheme(name.clone()));
                    theme::save_theme(&store, &state).await;
                    state
                },
                None => theme::load_theme(&store).await,
            };
            println!("Current theme: {}", current.current_theme());
            println!("Available themes: {}", theme::theme_names().collect::<Vec<_>>().join(", "));
            return Ok(());
        },
        Commands::Streak { complete } => {
            let tracker = StreakTracker::new(store.clone());
            let streak = if *complete {
                tracker.complete_challenge(today).await
            } else {
                tracker.check(today).await
            };
            println!("Current streak: {} days", streak.count);
            println!("Today's challenge: {}", Challenge::random().text());
            return Ok(());
        },
        _ => {},
    }

    let client = Client::from_settings(&settings)?;
    let mut board = Board::from_settings(client, store, &settings);
    if board.load().await == false {
        return Err(board.error().unwrap_or("Unable to load tasks").to_string().into());
    }

    let succeeded = match command {
        Commands::List => {
            let deadlines = board.deadlines().snapshot().await;
            utils::print_task_list(board.tasks(), &deadlines);
            true
        },
        Commands::Add { title, description } => {
            match board.create_task(&title, &description).await {
                Some(task) => { println!("Created task {}", task.id()); true },
                None => false,
            }
        },
        Commands::Done { id } => board.set_completed(&TaskId::from(id.as_str()), true).await,
        Commands::Undo { id } => board.set_completed(&TaskId::from(id.as_str()), false).await,
        Commands::Delete { id } => board.delete_task(&TaskId::from(id.as_str())).await,
        Commands::On { date } => {
            let date = match date {
                Some(date) => parse_date(&date)?,
                None => today,
            };
            for task in board.tasks_due(date).await {
                utils::print_task(&task, Some(date));
            }
            true
        },
        Commands::Calendar => {
            let markers = board.calendar_markers().await;
            let deadlines = board.deadlines().snapshot().await;
            utils::print_deadline_map(&deadlines, &markers);
            true
        },
        _ => true,
    };

    if succeeded == false {
        return Err(board.error().unwrap_or("Operation failed").to_string().into());
    }
    Ok(())
}

fn local_index(store: &FileStore, settings: &Settings) -> DeadlineIndex<FileStore> {
    DeadlineIndex::new(store.clone())
        .with_persist_timeout(settings.persist_timeout)
        .with_marker_policy(settings.marker_policy)
}

async fn check_saved(index: &DeadlineIndex<FileStore>) -> Result<(), Box<dyn Error>> {
    if index.has_unsaved_changes().await {
        return Err("the deadlines could not be saved (run with RUST_LOG=warn for details)".into());
    }
    Ok(())
}

fn parse_date(raw: &str) -> Result<NaiveDate, Box<dyn Error>> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|err| format!("Invalid date {:?} (expected YYYY-MM-DD): {}", raw, err).into())
}
