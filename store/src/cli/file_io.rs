use crate::cli_error::CliError;
use crate::data_store::{get_store_from_env, RegistrationStore};
use log::info;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use step_of_faith_api_types::Catalog;

/// Read the master data (counselors with their slots, schedule, seminars and seminar rounds with
/// their rooms) from the given JSON file and import it into the database in one transaction.
pub fn load_catalog_from_file(path: &PathBuf) -> Result<(), CliError> {
    let f = File::open(path).map_err(|e| {
        CliError::FileError(format!("Could not open {:?} for reading: {}", path, e))
    })?;
    let catalog: Catalog = serde_json::from_reader(BufReader::new(f))?;
    check_catalog(&catalog)?;

    let data_store_pool = get_store_from_env()?;
    let mut data_store = data_store_pool.get_facade()?;
    data_store.import_catalog(catalog.into())?;
    info!("Loaded catalog from {:?}", path);

    Ok(())
}

/// Check the catalog for problems which would otherwise only be reported as constraint violations
/// by the database.
fn check_catalog(catalog: &Catalog) -> Result<(), CliError> {
    for counselor in catalog.counselors.iter() {
        let mut times = HashSet::new();
        if let Some(time) = counselor.slots.iter().find(|time| !times.insert(**time)) {
            return Err(CliError::DataError(format!(
                "Slot {} of counselor {} is listed twice",
                time, counselor.id
            )));
        }
    }
    for round in catalog.rounds.iter() {
        let mut rooms = HashSet::new();
        for space in round.spaces.iter() {
            if space.capacity < 0 {
                return Err(CliError::DataError(format!(
                    "Capacity of room {} in seminar round {} is negative",
                    space.room, round.seminar_number
                )));
            }
            if !rooms.insert(space.room.as_str()) {
                return Err(CliError::DataError(format!(
                    "Room {} is listed twice in seminar round {}",
                    space.room, round.seminar_number
                )));
            }
        }
    }
    Ok(())
}
