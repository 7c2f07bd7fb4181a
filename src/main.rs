use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use boulevard81::api::{ApiError, BookingApi, DetailQuery, HttpApi};
use boulevard81::availability::{AvailabilityRules, CourtRow, SlotState};
use boulevard81::booking::{BookingView, NoticeLevel, Outcome, SelectError};
use boulevard81::catalog::sort_slots;
use boulevard81::config::{ClientConfig, ConfigError};
use boulevard81::dates::{self, DateError};
use boulevard81::session::{ActivityKind, Credentials, FileStore, Phase, SessionContext, StoreError, spawn_monitor};
use clap::{Args, Parser, Subcommand};
use time::Date;
use tokio::io::AsyncBufReadExt;
use tokio::time::MissedTickBehavior;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(ApiError),
    #[error(transparent)]
    Date(#[from] DateError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Select(#[from] SelectError),
    #[error("session expired; log in again")]
    SessionExpired,
    #[error("--day must be between 0 and {max}")]
    DayOutOfRange { max: u8 },
    #[error("{0} is outside the bookable week")]
    OutsideWindow(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "boulevard81", about = "Boulevard81 padel court booking client")]
struct Cli {
    /// Overrides BOULEVARD_BASE_URL.
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store a session token issued by the auth service.
    Login {
        #[arg(long)]
        token: String,
        #[arg(long)]
        user_id: Option<i64>,
        #[arg(long)]
        name: Option<String>,
    },
    Logout,
    Courts,
    Slots,
    /// Show past/full/available slots for one day.
    Availability(DateArgs),
    Reserve {
        #[arg(long)]
        court: String,
        #[arg(long)]
        slot: String,
        #[command(flatten)]
        date: DateArgs,
        /// Skip the confirmation prompt.
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
    Cancel {
        reservation_id: i64,
    },
    Detail {
        #[arg(long)]
        court: String,
        #[arg(long)]
        slot: String,
        #[command(flatten)]
        date: DateArgs,
        /// Defaults to the logged-in user.
        #[arg(long)]
        user_id: Option<i64>,
    },
    /// Keep the availability board on screen; every stdin line counts as activity.
    Watch {
        #[command(flatten)]
        date: DateArgs,
        #[arg(long, default_value_t = 30)]
        refresh_secs: u64,
    },
}

#[derive(Args, Debug, Clone)]
struct DateArgs {
    /// Date as DD-MM-YYYY.
    #[arg(long, conflicts_with = "day")]
    date: Option<String>,
    /// Days from today (0 = today).
    #[arg(long)]
    day: Option<u8>,
}

struct Ctx {
    config: ClientConfig,
    session: SessionContext,
    api: HttpApi,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url.as_deref() {
        config = config.with_base_url(base_url);
    }
    let store = FileStore::new(config.credentials_path.clone());
    debug!(path = %store.path().display(), "credential store");
    let session = SessionContext::init(Arc::new(store));
    let api = HttpApi::new(&config, session.clone()).map_err(CliError::Api)?;
    let ctx = Ctx { config, session, api };

    let result = run(&ctx, cli.command).await;
    if matches!(result, Err(CliError::SessionExpired)) {
        ctx.session.teardown();
    }
    result
}

async fn run(ctx: &Ctx, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login { token, user_id, name } => {
            ctx.session.login(Credentials { token, user_id, user_name: name })?;
            println!("logged in");
            Ok(())
        }
        Command::Logout => {
            ctx.session.teardown();
            println!("logged out");
            Ok(())
        }
        Command::Courts => run_courts(ctx).await,
        Command::Slots => run_slots(ctx).await,
        Command::Availability(date) => run_availability(ctx, &date).await,
        Command::Reserve { court, slot, date, yes } => run_reserve(ctx, &court, &slot, &date, yes).await,
        Command::Cancel { reservation_id } => {
            let message = ctx.api.cancel_reservation(reservation_id).await.map_err(api_error)?;
            println!("{message}");
            Ok(())
        }
        Command::Detail { court, slot, date, user_id } => {
            let user_id = user_id.or_else(|| ctx.session.credentials().and_then(|c| c.user_id));
            let query = DetailQuery { court, slot, date: resolve_date(&date)?, user_id };
            let detail = ctx.api.reservation_detail(&query).await.map_err(api_error)?;
            println!("{} {} {}", detail.court, dates::format_date(detail.date), detail.slot);
            for player in &detail.players {
                let id = player.id.map_or_else(|| "-".to_string(), |id| id.to_string());
                println!("  {id:>5}  {}", player.name.as_deref().unwrap_or("(unnamed)"));
            }
            if detail.players.is_empty() {
                println!("  no players");
            }
            Ok(())
        }
        Command::Watch { date, refresh_secs } => run_watch(ctx, &date, refresh_secs).await,
    }
}

fn api_error(e: ApiError) -> CliError {
    if e.is_unauthorized() { CliError::SessionExpired } else { CliError::Api(e) }
}

fn check(outcome: Outcome) -> Result<(), CliError> {
    match outcome {
        Outcome::SessionExpired => Err(CliError::SessionExpired),
        Outcome::Applied | Outcome::Stale => Ok(()),
    }
}

fn resolve_date(args: &DateArgs) -> Result<Date, CliError> {
    let today = dates::local_now().date();
    let window = dates::booking_window(today);
    let date = match (&args.date, args.day) {
        (Some(raw), _) => dates::parse_date(raw)?,
        (None, Some(day)) => *window
            .get(usize::from(day))
            .ok_or(CliError::DayOutOfRange { max: dates::BOOKING_WINDOW_DAYS - 1 })?,
        (None, None) => today,
    };
    if !window.contains(&date) {
        return Err(CliError::OutsideWindow(dates::format_date(date)));
    }
    Ok(date)
}

// =============================================================================
// COMMANDS
// =============================================================================

async fn run_courts(ctx: &Ctx) -> Result<(), CliError> {
    let courts = ctx.api.list_courts().await.map_err(api_error)?;
    for court in courts {
        let status = if court.enabled { "open" } else { "closed" };
        let slots = court
            .slot_ids
            .as_ref()
            .map_or_else(|| "all slots".to_string(), |ids| format!("{} slots", ids.len()));
        println!("{:>4}  {:<20} {status:<7} {slots}", court.id, court.name);
    }
    Ok(())
}

async fn run_slots(ctx: &Ctx) -> Result<(), CliError> {
    let slots = sort_slots(ctx.api.list_slots().await.map_err(api_error)?);
    for slot in slots {
        println!("{:>4}  {}", slot.id, slot.label);
    }
    Ok(())
}

async fn load_view(ctx: &Ctx, date: Date) -> Result<BookingView, CliError> {
    let mut view = BookingView::new(AvailabilityRules::from_config(&ctx.config), date);
    check(view.refresh(&ctx.api).await)?;
    Ok(view)
}

async fn run_availability(ctx: &Ctx, args: &DateArgs) -> Result<(), CliError> {
    let mut view = load_view(ctx, resolve_date(args)?).await?;
    print_notices(&mut view);
    print_grid(view.selected_date(), &view.grid(dates::local_now()), view.rules());
    Ok(())
}

async fn run_reserve(ctx: &Ctx, court: &str, slot: &str, args: &DateArgs, yes: bool) -> Result<(), CliError> {
    let mut view = load_view(ctx, resolve_date(args)?).await?;
    print_notices(&mut view);

    let pending = view.select_slot(court, slot, dates::local_now())?;
    if !yes && !confirm(&format!(
        "Reserve {} {} on {}? [y/N] ",
        pending.court,
        pending.slot,
        dates::format_date(pending.date)
    ))? {
        view.cancel_selection();
        println!("cancelled");
        return Ok(());
    }

    let outcome = view.submit(&ctx.api).await?;
    print_notices(&mut view);
    check(outcome)
}

async fn run_watch(ctx: &Ctx, args: &DateArgs, refresh_secs: u64) -> Result<(), CliError> {
    let date = resolve_date(args)?;
    let mut view = BookingView::new(AvailabilityRules::from_config(&ctx.config), date);
    let monitor = spawn_monitor(ctx.config.monitor, ctx.session.is_authenticated(), Arc::new(ctx.session.clone()));
    let mut phases = monitor.subscribe();
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut refresh = tokio::time::interval(Duration::from_secs(refresh_secs.max(1)));
    refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = refresh.tick() => {
                if view.refresh(&ctx.api).await == Outcome::SessionExpired {
                    monitor.set_authenticated(false);
                    return Err(CliError::SessionExpired);
                }
                print_notices(&mut view);
                print_grid(date, &view.grid(dates::local_now()), view.rules());
            }
            line = lines.next_line() => {
                match line? {
                    Some(_) => monitor.touch(ActivityKind::Key),
                    None => break,
                }
            }
            changed = phases.changed() => {
                if changed.is_err() {
                    break;
                }
                let phase = *phases.borrow_and_update();
                match phase {
                    Phase::Warning => eprintln!(
                        "Session inactive: logging out in {} seconds",
                        ctx.config.monitor.warning_period.as_secs()
                    ),
                    Phase::Expired => {
                        println!("Logged out due to inactivity");
                        break;
                    }
                    Phase::Idle | Phase::Active => {}
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    monitor.shutdown();
    Ok(())
}

// =============================================================================
// OUTPUT
// =============================================================================

fn print_notices(view: &mut BookingView) {
    for notice in view.drain_notices() {
        let tag = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warn",
            NoticeLevel::Error => "error",
        };
        eprintln!("[{tag}] {}", notice.message);
    }
}

fn print_grid(date: Date, rows: &[CourtRow<'_>], rules: AvailabilityRules) {
    println!("Availability for {}", dates::format_date(date));
    if rows.is_empty() {
        println!("  no courts");
    }
    for row in rows {
        println!("{}", row.court.name);
        if row.cells.is_empty() {
            println!("  no time slots");
        }
        for cell in &row.cells {
            let a = cell.availability;
            let status = match a.state {
                SlotState::Past => "past".to_string(),
                SlotState::Full => "full".to_string(),
                SlotState::Available => format!("available ({} of {} left)", a.remaining, rules.capacity),
            };
            println!("  {:<13} {status}", cell.slot.label);
        }
    }
}

fn confirm(prompt: &str) -> Result<bool, CliError> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "s" | "si" | "sí"))
}
