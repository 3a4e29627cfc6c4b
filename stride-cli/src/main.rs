use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use log::debug;

use stride::analytics::TrendDirection;
use stride::db::models::NewExerciseSet;
use stride::domain::{GoalType, WorkoutDetail, parse_date};
use stride::{StoreConfig, Tracker};

#[derive(Parser, Debug)]
#[command(version, about = "Stride - Workout Tracker CLI", long_about = None)]
struct Args {
    /// SQLite url, e.g. sqlite://stride.db. Defaults to DATABASE_URL.
    #[arg(short, long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the database and apply migrations
    Init,
    /// Start a workout, optionally from a template
    Start {
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        template: Option<i64>,
    },
    /// Finish the active workout
    Finish {
        #[arg(short, long)]
        rating: Option<i64>,
    },
    /// Log sets in the active workout
    Log {
        exercise: String,
        weight: f64,
        reps: i64,
        #[arg(short, long, default_value_t = 1)]
        sets: i64,
        #[arg(long)]
        rpe: Option<f64>,
        #[arg(long)]
        warmup: bool,
    },
    /// Show a workout with its exercises and sets
    Show { workout_id: Option<i64> },
    /// List workouts, newest first
    List {
        #[arg(short, long)]
        completed: bool,
    },
    /// Validate ordinals, references and field values
    Check {
        #[arg(long)]
        json: bool,
    },
    /// Remove orphans and renumber broken sequences
    Repair,
    /// Streak, period comparison and weekly volume
    Stats {
        #[arg(long, default_value_t = 7)]
        days: i64,
        #[arg(long, default_value_t = 4)]
        weeks: u32,
    },
    /// Personal records, for one exercise or all
    Records {
        #[arg(short, long)]
        exercise: Option<String>,
    },
    /// Log body weight, or show history and trend when no value is given
    Weight {
        value: Option<f64>,
        #[arg(long)]
        date: Option<String>,
    },
    /// Manage goals
    Goals {
        #[command(subcommand)]
        action: Option<GoalAction>,
    },
}

#[derive(Subcommand, Debug)]
enum GoalAction {
    /// Refresh progress and list goals
    List {
        #[arg(short, long)]
        all: bool,
    },
    /// Add a goal: strength, body_weight, frequency or volume
    Add {
        goal_type: String,
        target: f64,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        exercise: Option<String>,
        #[arg(long)]
        deadline: Option<String>,
    },
    /// Delete a goal
    Delete { goal_id: i64 },
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn arrow(direction: TrendDirection) -> &'static str {
    match direction {
        TrendDirection::Up => "↑",
        TrendDirection::Down => "↓",
        TrendDirection::Stable => "→",
    }
}

fn print_detail(detail: &WorkoutDetail) {
    println!("{}", detail.workout);
    if let Some(notes) = &detail.workout.notes {
        println!("  notes: {}", notes);
    }
    for entry in &detail.exercises {
        println!(
            "  {}. {} ({:.1}kg)",
            entry.order_in_workout,
            entry.exercise_name,
            entry.volume()
        );
        for set in &entry.sets {
            println!("      {}", set);
        }
    }
}

async fn run(tracker: &Tracker, command: Commands) -> Result<()> {
    match command {
        Commands::Init => {
            let exercises = tracker.exercises().await?;
            println!("Database ready, {} exercises available", exercises.len());
        }
        Commands::Start { name, template } => {
            let workout = match template {
                Some(id) => {
                    let detail = tracker.start_workout_from_template(id).await?;
                    print_detail(&detail);
                    detail.workout
                }
                None => tracker.start_workout(name.as_deref()).await?,
            };
            println!("Started {}", workout);
        }
        Commands::Finish { rating } => {
            let workout = tracker.finish_workout(rating).await?;
            println!("Finished {}", workout);
        }
        Commands::Log {
            exercise,
            weight,
            reps,
            sets,
            rpe,
            warmup,
        } => {
            let set = NewExerciseSet {
                weight,
                reps,
                rpe,
                tempo: None,
                is_warmup: warmup,
            };
            let logged = tracker.log_sets_by_name(&exercise, &set, sets).await?;
            for set in &logged.sets {
                println!("Logged {}", set);
            }
            for kind in &logged.new_records {
                println!("New personal record: {}", kind);
            }
        }
        Commands::Show { workout_id } => {
            let workout_id = match workout_id {
                Some(id) => id,
                None => tracker.current_workout().await?.id,
            };
            print_detail(&tracker.workout_detail(workout_id).await?);
        }
        Commands::List { completed } => {
            let workouts = tracker.list_workouts(completed).await?;
            if workouts.is_empty() {
                println!("No workouts found");
            }
            for workout in workouts {
                println!("{}", workout);
            }
        }
        Commands::Check { json } => {
            let report = tracker.check_integrity().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if report.is_clean() {
                println!("No integrity issues found");
            } else {
                for message in report.messages() {
                    println!("{}", message);
                }
                println!(
                    "{} errors, {} warnings",
                    report.error_count(),
                    report.warning_count()
                );
            }
        }
        Commands::Repair => {
            let outcome = tracker.repair_all().await?;
            if outcome.changed_anything() {
                println!(
                    "Removed {} orphaned rows, renumbered {} rows in {} groups",
                    outcome.orphans_removed, outcome.rows_renumbered, outcome.groups_repaired
                );
            } else {
                println!("Nothing to repair");
            }
        }
        Commands::Stats { days, weeks } => {
            let today = today();
            let streak = tracker.streak(today).await?;
            println!(
                "Streak: {} days (longest {}){}",
                streak.current,
                streak.longest,
                if streak.is_active { "" } else { ", inactive" }
            );

            let comparison = tracker.compare_periods(today, days).await?;
            println!(
                "Last {} days: {} workouts {}, {:.1}kg volume {}",
                days,
                comparison.current.workout_count,
                arrow(comparison.frequency_trend.direction),
                comparison.current.total_volume,
                arrow(comparison.volume_trend.direction)
            );

            if let Some(improvement) = tracker.most_improved(today, days).await? {
                let exercise = tracker.exercise(improvement.exercise_id).await?;
                println!(
                    "Most improved: {} +{:.1}kg ({:.1} -> {:.1})",
                    exercise.name, improvement.gain, improvement.previous_best, improvement.current_best
                );
            }

            for week in tracker.weekly_volume(weeks, today).await? {
                println!(
                    "  {} .. {}: {:.1}kg over {} sets",
                    week.start, week.end, week.volume, week.set_count
                );
            }
        }
        Commands::Records { exercise } => {
            let exercise_id = match exercise {
                Some(name) => Some(
                    tracker
                        .find_exercise(&name)
                        .await?
                        .with_context(|| format!("unknown exercise {name}"))?
                        .id,
                ),
                None => None,
            };
            let names = tracker.exercises().await?;
            for record in tracker.personal_records(exercise_id).await? {
                let name = names
                    .iter()
                    .find(|e| e.id == record.exercise_id)
                    .map(|e| e.name.as_str())
                    .unwrap_or("Unknown");
                println!(
                    "{}: {} {:.1} on {}",
                    name, record.kind, record.value, record.achieved_on
                );
            }
        }
        Commands::Weight { value, date } => {
            let date = date.as_deref().map(parse_date).transpose()?.unwrap_or_else(today);
            match value {
                Some(weight) => {
                    tracker.log_weight(weight, date, None).await?;
                    println!("Logged {:.1}kg on {}", weight, date);
                }
                None => {
                    for point in tracker.weight_history().await?.iter().take(10) {
                        println!("{}: {:.1}kg", point.date, point.weight);
                    }
                    if let Some(trend) = tracker.weight_trend(date).await? {
                        println!(
                            "30-day average {:.1}kg {} ({:+.1}%)",
                            trend.current,
                            arrow(trend.direction),
                            trend.percent_change.unwrap_or(0.0)
                        );
                    }
                }
            }
        }
        Commands::Goals { action } => match action.unwrap_or(GoalAction::List { all: false }) {
            GoalAction::List { all } => {
                tracker.refresh_goals().await?;
                let today = today();
                for goal in tracker.goals(all).await? {
                    println!(
                        "#{} [{}] {}: {:.1} / {:.1} ({:.0}%){}",
                        goal.id,
                        goal.goal_type,
                        goal.title,
                        goal.current_value,
                        goal.target_value,
                        goal.progress() * 100.0,
                        if goal.is_completed {
                            " done"
                        } else if goal.is_overdue(today) {
                            " overdue"
                        } else {
                            ""
                        }
                    );
                }
            }
            GoalAction::Add {
                goal_type,
                target,
                title,
                exercise,
                deadline,
            } => {
                let goal_type: GoalType = goal_type.parse()?;
                let exercise_id = match exercise {
                    Some(name) => Some(tracker.get_or_create_exercise(&name).await?.id),
                    None => None,
                };
                let deadline = deadline.as_deref().map(parse_date).transpose()?;
                let title = title.unwrap_or_else(|| format!("{} {}", goal_type, target));
                let goal = tracker
                    .create_goal(goal_type, exercise_id, &title, target, deadline)
                    .await?;
                println!("Created goal #{} starting at {:.1}", goal.id, goal.start_value);
            }
            GoalAction::Delete { goal_id } => {
                tracker.delete_goal(goal_id).await?;
                println!("Deleted goal #{}", goal_id);
            }
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let config = match args.database {
        Some(url) => StoreConfig::new(url),
        None => StoreConfig::from_env()?,
    };
    if config.is_in_memory() && !matches!(args.command, Commands::Init) {
        bail!("an in-memory database does not persist between commands");
    }
    debug!("Using database {}", config.database_url);

    let tracker = Tracker::open(&config).await?;
    let result = run(&tracker, args.command).await;
    tracker.close().await;
    result
}
