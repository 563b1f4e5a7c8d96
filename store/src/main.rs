use chrono::NaiveTime;
use clap::ArgAction;
use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use log::{error, warn};
use std::path::PathBuf;
use step_of_faith_store::cli::{
    database_migration, file_io, manage_counseling, manage_seminars, manage_users, OutputFormat,
};
use step_of_faith_store::cli_error::CliError;

fn main() {
    let args = CliArgs::parse();
    let dotenv_result = dotenv();

    let env = env_logger::Env::new().filter_or(
        "RUST_LOG",
        match args.global_opts.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        },
    );
    env_logger::Builder::from_env(env).init();
    if let Err(e) = dotenv_result {
        warn!("Could not read .env file: {}", e);
    }

    let format = if args.global_opts.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    if let Err(e) = run_command(args.command, format) {
        error!("{}", e);
        std::process::exit(e.exit_code());
    }
}

fn run_command(command: Command, format: OutputFormat) -> Result<(), CliError> {
    if !matches!(command, Command::MigrateDb) {
        database_migration::check_migration_state()?;
    }
    match command {
        Command::MigrateDb => database_migration::run_migrations(),
        Command::LoadData { path } => file_io::load_catalog_from_file(&path),
        Command::Register { user_id, username } => manage_users::register_user(user_id, username),
        Command::ShowSchedule { day } => manage_users::print_schedule(day, format),
        Command::ListCounselors => manage_counseling::print_counselor_list(format),
        Command::FreeSlots { counselor_id } => {
            manage_counseling::print_free_slots(counselor_id, format)
        }
        Command::BookCounseling {
            counselor_id,
            user_id,
            time,
        } => manage_counseling::book_counseling(counselor_id, user_id, time),
        Command::ShowCounseling { user_id } => {
            manage_counseling::print_my_counseling(user_id, format)
        }
        Command::CancelCounseling { user_id } => manage_counseling::cancel_counseling(user_id),
        Command::ListOpenSeminars { round } => manage_seminars::print_open_seminars(round, format),
        Command::ShowSeminar { seminar_id } => manage_seminars::print_seminar(seminar_id, format),
        Command::Enroll {
            round,
            user_id,
            seminar_id,
        } => manage_seminars::enroll_for_seminar(round, user_id, seminar_id),
        Command::ShowEnrollment { user_id, round } => {
            manage_seminars::print_my_seminar(user_id, round, format)
        }
        Command::CancelSeminar { user_id, round } => {
            manage_seminars::cancel_seminar(user_id, round)
        }
    }
}

/// Administration tool for the counseling and seminar registration database
#[derive(Debug, Parser)]
#[clap(name = "step-of-faith-store", version)]
pub struct CliArgs {
    #[clap(flatten)]
    global_opts: GlobalOpts,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Migrate the database schema to the current version
    MigrateDb,
    /// Load the counselors, schedule, seminars and seminar rounds from a JSON file
    LoadData {
        /// The path of the JSON file to read from
        path: PathBuf,
    },
    /// Register a new user
    Register { user_id: i64, username: String },
    /// Show the schedule of one day
    ShowSchedule { day: i32 },
    /// List all counselors
    ListCounselors,
    /// Show the free counseling slots of a counselor
    FreeSlots { counselor_id: i32 },
    /// Book a counseling slot for a user, replacing the user's previous booking
    BookCounseling {
        counselor_id: i32,
        user_id: i64,
        /// Time of the slot (HH:MM:SS)
        time: NaiveTime,
    },
    /// Show the counseling booked by a user
    ShowCounseling { user_id: i64 },
    /// Cancel the counseling booked by a user
    CancelCounseling { user_id: i64 },
    /// List the seminars which are open for enrollment in a seminar round
    ListOpenSeminars { round: i32 },
    /// Show the details of a seminar
    ShowSeminar { seminar_id: i32 },
    /// Enroll a user for a seminar in a seminar round
    Enroll {
        round: i32,
        user_id: i64,
        seminar_id: i32,
    },
    /// Show the seminar a user is enrolled for in a seminar round
    ShowEnrollment { user_id: i64, round: i32 },
    /// Cancel the seminar enrollment of a user in a seminar round
    CancelSeminar { user_id: i64, round: i32 },
}

#[derive(Debug, Args)]
struct GlobalOpts {
    /// Verbosity level (can be specified multiple times)
    #[clap(long, short, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Print data as JSON instead of text tables
    #[clap(long, global = true)]
    json: bool,
}
