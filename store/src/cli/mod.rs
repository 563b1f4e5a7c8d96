use crate::cli_error::CliError;
use serde::Serialize;

pub mod database_migration;
pub mod file_io;
pub mod manage_counseling;
pub mod manage_seminars;
pub mod manage_users;

/// Output format of the commands which print data from the database
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text and tables
    Text,
    /// The data serialized as JSON, using the api types
    Json,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn new_table() -> comfy_table::Table {
    let mut table = comfy_table::Table::new();
    table
        .load_preset(comfy_table::presets::ASCII_BORDERS_ONLY_CONDENSED)
        .set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
    table
}
