//! `examsched` CLI — room occupancy, free exam slots, the exam-period
//! calendar, dean approvals and notifications from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Free/busy timeline of every lecture room today
//! examsched occupancy
//!
//! # One building on a given date, faithful (unmerged) sweep, as JSON
//! examsched occupancy --building BCL --date 2025-06-02 --raw --json
//!
//! # Which rooms can host a 90-minute exam, slot by slot
//! examsched slots --duration 90 --date 2025-06-02
//!
//! # Exam periods for June 2025, finals only
//! examsched calendar --year 2025 --month 6 --category Final
//!
//! # Dean approvals
//! examsched requests list
//! examsched requests approve 6f1c2d7e-8a43-4c55-9d0e-1b2a3c4d5e6f
//!
//! # Serve every table from local JSON files instead of the hosted store
//! examsched --offline ./fixtures occupancy
//! ```

mod render;
mod settings;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use exam_store::approval::{ApprovalBoard, Decision};
use exam_store::periods::{self, PeriodSnapshot};
use exam_store::{rooms, storage, DataStore, MemoryStore, NotificationList, RestStore};
use occupancy_engine::occupancy::{RoomFilter, SweepMode, DEFAULT_ROOM_TYPE};
use occupancy_engine::{find_conflicts, MonthGrid, PeriodFilter};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::settings::Settings;

/// Room type value that disables the room-type filter.
const ANY_ROOM_TYPE: &str = "any";

#[derive(Parser)]
#[command(
    name = "examsched",
    version,
    about = "Exam room occupancy, calendar and approvals"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Extra configuration file (TOML), layered over the user config
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Serve tables from DIR/<table>.json instead of the hosted store.
    /// Changes made in this mode are not written back.
    #[arg(long, global = true, value_name = "DIR")]
    offline: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Args)]
struct RoomArgs {
    /// Only rooms in this building
    #[arg(long)]
    building: Option<String>,
    /// Room type to show ("any" for all types) [default: Lecture]
    #[arg(long)]
    room_type: Option<String>,
    /// Day to inspect (defaults to today in the campus timezone)
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

impl RoomArgs {
    /// Without `--room-type`, only lecture rooms are listed unless a single
    /// room was asked for by id.
    fn filter(&self, room: Option<&str>) -> RoomFilter {
        let room_type = match self.room_type.as_deref() {
            Some(t) if t.eq_ignore_ascii_case(ANY_ROOM_TYPE) => None,
            Some(t) => Some(t.to_string()),
            None if room.is_some() => None,
            None => Some(DEFAULT_ROOM_TYPE.to_string()),
        };
        RoomFilter {
            building_id: self.building.clone(),
            room_type,
        }
    }
}

#[derive(clap::Args)]
struct CalendarArgs {
    #[arg(long)]
    year: Option<i32>,
    #[arg(long)]
    month: Option<u32>,
    #[arg(long)]
    academic_year: Option<String>,
    /// Exam category, e.g. Midterm or Final
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    college: Option<String>,
    #[arg(long)]
    department: Option<String>,
    /// Term id
    #[arg(long)]
    term: Option<i64>,
    #[arg(long)]
    json: bool,
}

impl CalendarArgs {
    fn filter(&self) -> PeriodFilter {
        PeriodFilter {
            academic_year: self.academic_year.clone(),
            exam_category: self.category.clone(),
            college_id: self.college.clone(),
            department_id: self.department.clone(),
            term_id: self.term,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Free/occupied timeline of each room over the exam day
    Occupancy {
        #[command(flatten)]
        rooms: RoomArgs,
        /// Only this room
        #[arg(long)]
        room: Option<String>,
        /// Sweep bookings as stored, without merging overlaps
        #[arg(long)]
        raw: bool,
    },
    /// Rooms free in each back-to-back exam slot of the day
    Slots {
        #[command(flatten)]
        rooms: RoomArgs,
        /// Exam length in minutes
        #[arg(long)]
        duration: i64,
    },
    /// Exams that double-book a room
    Conflicts {
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        json: bool,
    },
    /// Month grid of exam periods
    Calendar(CalendarArgs),
    /// Schedule approval requests
    Requests {
        #[command(subcommand)]
        action: RequestAction,
    },
    /// A user's notifications
    Notifications {
        #[command(subcommand)]
        action: NotificationAction,
    },
    /// Re-render a view whenever its data changes (Ctrl-C to stop)
    Watch {
        #[command(subcommand)]
        target: WatchTarget,
    },
}

#[derive(Subcommand)]
enum RequestAction {
    /// Pending requests and recent decisions
    List,
    /// Approve a pending request
    Approve { request_id: Uuid },
    /// Reject a pending request
    Reject { request_id: Uuid },
}

#[derive(Subcommand)]
enum NotificationAction {
    List {
        #[arg(long)]
        user: i64,
    },
    /// Mark a notification as read
    Read {
        id: i64,
        #[arg(long)]
        user: i64,
    },
}

#[derive(Subcommand)]
enum WatchTarget {
    /// The exam-period calendar
    Periods(CalendarArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = Settings::load(cli.config.as_deref())?;
    let tz = settings.timezone()?;
    let store = open_store(&settings, cli.offline.as_deref()).await?;

    match cli.command {
        Commands::Occupancy { rooms: args, room, raw } => {
            let window = settings.window_for(day_or_today(args.date, tz))?;
            let mode = if raw { SweepMode::Raw } else { SweepMode::Merged };
            let filter = args.filter(room.as_deref());
            let mut found = rooms::occupancy(store.as_ref(), &filter, &window, mode)
                .await
                .context("Failed to load room occupancy")?;
            if let Some(room) = room {
                found.retain(|r| r.room.room_id == room);
            }
            if args.json {
                println!("{}", serde_json::to_string_pretty(&found)?);
            } else {
                print!("{}", render::occupancy(&found, &window, tz));
            }
        }
        Commands::Slots { rooms: args, duration } => {
            anyhow::ensure!(duration > 0, "--duration must be a positive number of minutes");
            let window = settings.window_for(day_or_today(args.date, tz))?;
            let slots = rooms::free_rooms(store.as_ref(), &args.filter(None), &window, duration)
                .await
                .context("Failed to load free rooms")?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&slots)?);
            } else {
                print!("{}", render::slots(&slots, tz));
            }
        }
        Commands::Conflicts { date, json } => {
            let window = settings.window_for(day_or_today(date, tz))?;
            let bookings = rooms::load_bookings(store.as_ref(), None, window.day_start, window.day_end)
                .await
                .context("Failed to load exam bookings")?;
            let conflicts = find_conflicts(&bookings);
            if json {
                println!("{}", serde_json::to_string_pretty(&conflicts)?);
            } else {
                print!("{}", render::conflicts(&conflicts, tz));
            }
        }
        Commands::Calendar(args) => {
            let snapshot = periods::load_snapshot(store.as_ref())
                .await
                .context("Failed to load exam periods")?;
            let grid = month_grid(&args, &snapshot, tz)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&grid)?);
            } else {
                print!("{}", render::month(&grid, &snapshot.terms));
            }
        }
        Commands::Requests { action } => {
            let mut board = ApprovalBoard::load(store.as_ref())
                .await
                .context("Failed to load approval requests")?;
            match action {
                RequestAction::List => {
                    let base = settings.store.url.clone();
                    let bucket = settings.storage.bucket.clone();
                    print!(
                        "{}",
                        render::board(&board, tz, |path| file_link(base.as_deref(), &bucket, path))
                    );
                }
                RequestAction::Approve { request_id } => {
                    decide(&mut board, store.as_ref(), request_id, Decision::Approve).await?;
                }
                RequestAction::Reject { request_id } => {
                    decide(&mut board, store.as_ref(), request_id, Decision::Reject).await?;
                }
            }
        }
        Commands::Notifications { action } => match action {
            NotificationAction::List { user } => {
                let list = NotificationList::load(store.as_ref(), user)
                    .await
                    .context("Failed to load notifications")?;
                print!(
                    "{}",
                    render::notifications(list.items(), list.unread_count(), tz)
                );
            }
            NotificationAction::Read { id, user } => {
                let mut list = NotificationList::new(user);
                list.mark_as_read(store.as_ref(), id)
                    .await
                    .with_context(|| format!("Failed to mark notification {id} as read"))?;
                println!(
                    "Marked notification {id} as read ({} unread left)",
                    list.unread_count()
                );
            }
        },
        Commands::Watch {
            target: WatchTarget::Periods(args),
        } => watch_periods(store, &settings, &args, tz).await?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn open_store(settings: &Settings, offline: Option<&Path>) -> Result<Arc<dyn DataStore>> {
    match offline {
        Some(dir) => {
            debug!(dir = %dir.display(), "using offline tables");
            let store = MemoryStore::from_dir(dir)
                .await
                .with_context(|| format!("Failed to load tables from {}", dir.display()))?;
            Ok(Arc::new(store))
        }
        None => {
            let store = RestStore::new(settings.rest_config()?).context("Failed to create store client")?;
            Ok(Arc::new(store))
        }
    }
}

fn day_or_today(date: Option<NaiveDate>, tz: Tz) -> NaiveDate {
    date.unwrap_or_else(|| Utc::now().with_timezone(&tz).date_naive())
}

fn month_grid(args: &CalendarArgs, snapshot: &PeriodSnapshot, tz: Tz) -> Result<MonthGrid> {
    let today = Utc::now().with_timezone(&tz).date_naive();
    let year = args.year.unwrap_or(today.year());
    let month = args.month.unwrap_or(today.month());
    Ok(MonthGrid::build(
        year,
        month,
        &snapshot.periods,
        &args.filter(),
        today,
        tz,
    )?)
}

async fn decide(
    board: &mut ApprovalBoard,
    store: &dyn DataStore,
    request_id: Uuid,
    decision: Decision,
) -> Result<()> {
    let decided = board
        .decide(store, request_id, decision)
        .await
        .with_context(|| format!("Failed to update request {request_id}"))?;
    println!("Request {} is now {}", decided.request_id, decided.status);
    Ok(())
}

/// Stored file URLs may be absolute or a path inside the storage bucket.
fn file_link(base_url: Option<&str>, bucket: &str, stored: &str) -> String {
    if stored.starts_with("http://") || stored.starts_with("https://") {
        return stored.to_string();
    }
    base_url
        .and_then(|base| storage::public_url(base, bucket, stored).ok())
        .map(|url| url.to_string())
        .unwrap_or_else(|| stored.to_string())
}

async fn watch_periods(
    store: Arc<dyn DataStore>,
    settings: &Settings,
    args: &CalendarArgs,
    tz: Tz,
) -> Result<()> {
    let shutdown = CancellationToken::new();
    let mut sub = periods::watch_periods(store, settings.poll_interval(), shutdown.child_token());
    info!(interval = ?settings.poll_interval(), "watching exam periods");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                shutdown.cancel();
                break;
            }
            snapshot = sub.changed() => {
                let Some(snapshot) = snapshot else { break };
                let grid = month_grid(args, &snapshot, tz)?;
                if args.json {
                    println!("{}", serde_json::to_string(&grid)?);
                } else {
                    println!("{}", render::month(&grid, &snapshot.terms));
                }
            }
        }
    }

    sub.join().await;
    Ok(())
}
