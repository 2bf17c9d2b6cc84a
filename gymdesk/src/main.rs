//! gymdesk - command-line front end for the gym desk
//!
//! Opens the desk's record files, runs one command and saves whatever
//! the command changed.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use gymdesk_engine::collection::Record;
use gymdesk_engine::entities::{Activity, Pack, Sex, User, UserKind};
use gymdesk_engine::{Desk, DeskError, Handle, StatusCode};

mod config;

use config::Config;

/// gymdesk - manage a gym's users, activities and packs
#[derive(Parser, Debug)]
#[command(name = "gymdesk")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data directory for relative file paths
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a table of records
    List {
        #[arg(value_enum)]
        what: Listing,

        /// Only users of this kind (manager, employee, client)
        #[arg(long)]
        kind: Option<UserKind>,
    },

    /// Show one user
    Show { username: String },

    /// Register a user
    AddUser {
        username: String,
        pass: String,
        name: String,

        #[arg(long, default_value = "client")]
        kind: UserKind,

        #[arg(long)]
        age: Option<i32>,

        /// M or F
        #[arg(long)]
        sex: Option<Sex>,

        /// Metres
        #[arg(long)]
        height: Option<f32>,

        /// Kilograms
        #[arg(long)]
        weight: Option<f32>,
    },

    /// Schedule an activity (day 2 = Monday .. 7 = Saturday, hour 8..21)
    AddActivity {
        name: String,
        day: i32,
        hour: i32,
        mins: i32,

        /// Minutes
        #[arg(long)]
        duration: Option<i32>,

        #[arg(long)]
        cost: Option<f32>,

        /// Maximum number of seats
        #[arg(long)]
        seats: Option<u32>,
    },

    /// Offer a pack
    AddPack { name: String, months: i32, cost: f64 },

    RemoveUser { username: String },

    RemoveActivity { name: String },

    RemovePack { name: String },

    /// Change a username
    Rename { username: String, new_username: String },

    /// Move an activity to another slot
    Reschedule {
        name: String,
        day: i32,
        hour: i32,
        mins: i32,
    },

    /// Take a seat in an activity
    Book { name: String },

    /// Give a seat in an activity back
    Unbook { name: String },

    /// Credit a user's balance
    Pay { username: String, amount: f32 },

    /// Check a username and password
    Login { username: String, pass: String },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Listing {
    Users,
    Activities,
    Packs,
}

const USER_HEADER: &str = "KIND, USERNAME, NAME, AGE, SEX, HEIGHT, WEIGHT, BMI, BALANCE";
const ACTIVITY_HEADER: &str = "[DAY; HH:MM], NAME, DURATION, [SEATS]";
const PACK_HEADER: &str = "NAME, MONTHS, COST";

fn init_logging(level: &str) -> Result<()> {
    let log_level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let level = args
        .log_level
        .as_deref()
        .or(config.log_level.as_deref())
        .unwrap_or("warn");
    init_logging(level)?;

    let paths = config.desk_paths(args.data_dir.as_deref());
    debug!("Record files: {:?}", paths);
    let mut desk = Desk::open(&paths).context("opening desk")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&mut desk, args.command, &mut out)?;

    if desk.is_dirty() {
        let written = desk.save().context("saving desk")?;
        info!("{} files updated", written);
    }
    Ok(())
}

fn run(desk: &mut Desk, command: Command, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::List { what, kind } => match what {
            Listing::Users => match kind {
                Some(kind) => desk.users_of_kind(kind).print_all(
                    out,
                    Some(User::print_line),
                    true,
                    Some(USER_HEADER),
                )?,
                None => desk
                    .users()
                    .print_all(out, Some(User::print_line), true, Some(USER_HEADER))?,
            },
            Listing::Activities => desk.activities().print_all(
                out,
                Some(Activity::print_line),
                true,
                Some(ACTIVITY_HEADER),
            )?,
            Listing::Packs => desk
                .packs()
                .print_all(out, Some(Pack::print_line), true, Some(PACK_HEADER))?,
        },

        Command::Show { username } => {
            let handle = find_user(desk, &username)?;
            if let Some(user) = desk.user(handle) {
                user.print(out)?;
            }
        }

        Command::AddUser {
            username,
            pass,
            name,
            kind,
            age,
            sex,
            height,
            weight,
        } => {
            let mut user = User::new(&username, &pass, &name, kind)?;
            if let Some(age) = age {
                user.age = age;
            }
            if let Some(sex) = sex {
                user.sex = sex;
            }
            if let Some(height) = height {
                user.height = height;
            }
            if let Some(weight) = weight {
                user.weight = weight;
            }
            desk.add_user(user)
                .with_context(|| format!("adding user {}", username))?;
            writeln!(out, "Added {} {}", kind, username)?;
        }

        Command::AddActivity {
            name,
            day,
            hour,
            mins,
            duration,
            cost,
            seats,
        } => {
            let mut activity = Activity::new(&name, day, hour, mins)?;
            if let Some(duration) = duration {
                activity.duration = duration;
            }
            if let Some(cost) = cost {
                activity.cost = cost;
            }
            if let Some(seats) = seats {
                activity.max_seats = seats;
            }
            desk.add_activity(activity)
                .with_context(|| format!("slot of {} already taken", name))?;
            writeln!(out, "Scheduled {}", name)?;
        }

        Command::AddPack { name, months, cost } => {
            desk.add_pack(Pack::new(&name, months, cost)?)
                .with_context(|| format!("adding pack {}", name))?;
            writeln!(out, "Added pack {}", name)?;
        }

        Command::RemoveUser { username } => {
            let handle = find_user(desk, &username)?;
            desk.remove_user(handle);
            writeln!(out, "Removed {}", username)?;
        }

        Command::RemoveActivity { name } => {
            let handle = find_activity(desk, &name)?;
            desk.remove_activity(handle);
            writeln!(out, "Removed {}", name)?;
        }

        Command::RemovePack { name } => {
            let handle = found(desk.find_pack(&name))
                .with_context(|| format!("no pack named {}", name))?;
            desk.remove_pack(handle);
            writeln!(out, "Removed pack {}", name)?;
        }

        Command::Rename {
            username,
            new_username,
        } => {
            let handle = find_user(desk, &username)?;
            desk.rename_user(handle, &new_username)
                .with_context(|| format!("renaming {} to {}", username, new_username))?;
            writeln!(out, "Renamed {} to {}", username, new_username)?;
        }

        Command::Reschedule {
            name,
            day,
            hour,
            mins,
        } => {
            let handle = find_activity(desk, &name)?;
            desk.reschedule_activity(handle, day, hour, mins)
                .with_context(|| format!("rescheduling {}", name))?;
            writeln!(out, "Rescheduled {}", name)?;
        }

        Command::Book { name } => {
            let handle = find_activity(desk, &name)?;
            desk.book_activity(handle)?;
            if let Some(activity) = desk.activity(handle) {
                writeln!(
                    out,
                    "Booked {} [{}/{}]",
                    name, activity.seats_taken, activity.max_seats
                )?;
            }
        }

        Command::Unbook { name } => {
            let handle = find_activity(desk, &name)?;
            desk.cancel_booking(handle)?;
            if let Some(activity) = desk.activity(handle) {
                writeln!(
                    out,
                    "Cancelled {} [{}/{}]",
                    name, activity.seats_taken, activity.max_seats
                )?;
            }
        }

        Command::Pay { username, amount } => {
            let handle = find_user(desk, &username)?;
            desk.update_user(handle, |user| user.pay(amount))?;
            if let Some(user) = desk.user(handle) {
                writeln!(out, "Balance of {}: {:.2}", username, user.balance)?;
            }
        }

        Command::Login { username, pass } => match desk.authenticate(&username, &pass) {
            Some(user) => writeln!(out, "Welcome, {} ({})", user.name, user.kind)?,
            None => bail!("invalid username or password"),
        },
    }
    Ok(())
}

fn found(handle: Option<Handle>) -> Result<Handle, DeskError> {
    handle.ok_or(DeskError::Status(StatusCode::KeyNotFound))
}

fn find_user(desk: &Desk, username: &str) -> Result<Handle> {
    found(desk.find_user(username)).with_context(|| format!("no user named {}", username))
}

fn find_activity(desk: &Desk, name: &str) -> Result<Handle> {
    found(desk.find_activity_by_name(name))
        .with_context(|| format!("no activity named {}", name))
}
