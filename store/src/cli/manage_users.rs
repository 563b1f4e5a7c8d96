use crate::cli::{new_table, print_json, OutputFormat};
use crate::cli_error::CliError;
use crate::data_store::models::User;
use crate::data_store::{get_store_from_env, Day, RegistrationStore, RegistrationStoreFacade};
use crate::data_store::{UserId, DEFAULT_SEMINAR_ROUNDS};

pub fn register_user(user_id: UserId, username: String) -> Result<(), CliError> {
    let data_store_pool = get_store_from_env()?;
    let mut data_store = data_store_pool.get_facade()?;

    if data_store.user_exists(user_id)? {
        return Err(CliError::DataError(format!(
            "User {} is registered already",
            user_id
        )));
    }
    data_store.register_user(User {
        id: user_id,
        username,
    })?;
    println!(
        "Registered user {} for seminar rounds {:?}",
        user_id, DEFAULT_SEMINAR_ROUNDS
    );
    Ok(())
}

pub fn print_schedule(day: Day, format: OutputFormat) -> Result<(), CliError> {
    let data_store_pool = get_store_from_env()?;
    let mut data_store = data_store_pool.get_facade()?;

    let schedule = data_store.get_schedule_for_day(day)?;
    if format == OutputFormat::Json {
        let schedule: Vec<step_of_faith_api_types::ScheduleItem> =
            schedule.into_iter().map(|item| item.into()).collect();
        return print_json(&schedule);
    }

    let mut table = new_table();
    table
        .set_header(vec!["time", "event"])
        .add_rows(
            schedule
                .into_iter()
                .map(|item| [item.time.format("%H:%M").to_string(), item.event]),
        );

    println!("Schedule of day {}:", day);
    println!("{table}");
    Ok(())
}

/// Fail with a [CliError::DataError] if the user has not been registered
pub(super) fn ensure_user_exists(
    data_store: &mut dyn RegistrationStoreFacade,
    user_id: UserId,
) -> Result<(), CliError> {
    if !data_store.user_exists(user_id)? {
        return Err(CliError::DataError(format!(
            "User {} is not registered",
            user_id
        )));
    }
    Ok(())
}
