use crate::cli::manage_users::ensure_user_exists;
use crate::cli::{new_table, print_json, OutputFormat};
use crate::cli_error::CliError;
use crate::data_store::{get_store_from_env, RegistrationStore};
use crate::data_store::{SeminarId, SeminarNumber, UserId};

pub fn print_open_seminars(
    seminar_number: SeminarNumber,
    format: OutputFormat,
) -> Result<(), CliError> {
    let data_store_pool = get_store_from_env()?;
    let mut data_store = data_store_pool.get_facade()?;

    let starts_at = data_store
        .get_seminar_start_time(seminar_number)?
        .ok_or_else(|| {
            CliError::DataError(format!("Seminar round {} does not exist", seminar_number))
        })?;
    let seminars = data_store.get_open_seminars(seminar_number)?;
    if format == OutputFormat::Json {
        let seminars: Vec<step_of_faith_api_types::OpenSeminar> =
            seminars.into_iter().map(|s| s.into()).collect();
        return print_json(&seminars);
    }

    let mut table = new_table();
    table
        .set_header(vec!["id", "title"])
        .add_rows(
            seminars
                .into_iter()
                .map(|seminar| [seminar.id.to_string(), seminar.title]),
        );

    println!(
        "Open seminars of round {} (starting at {}):",
        seminar_number,
        starts_at.format("%H:%M")
    );
    println!("{table}");
    Ok(())
}

pub fn print_seminar(seminar_id: SeminarId, format: OutputFormat) -> Result<(), CliError> {
    let data_store_pool = get_store_from_env()?;
    let mut data_store = data_store_pool.get_facade()?;

    let seminar = data_store
        .get_seminar(seminar_id)?
        .ok_or_else(|| CliError::DataError(format!("Seminar {} does not exist", seminar_id)))?;
    if format == OutputFormat::Json {
        return print_json(&step_of_faith_api_types::Seminar::from(seminar));
    }
    println!("{} ({})", seminar.title, seminar.speaker);
    if !seminar.description.is_empty() {
        println!("{}", seminar.description);
    }
    Ok(())
}

pub fn enroll_for_seminar(
    seminar_number: SeminarNumber,
    user_id: UserId,
    seminar_id: SeminarId,
) -> Result<(), CliError> {
    let data_store_pool = get_store_from_env()?;
    let mut data_store = data_store_pool.get_facade()?;

    ensure_user_exists(&mut *data_store, user_id)?;
    if !data_store.enroll_for_seminar(seminar_number, user_id, seminar_id)? {
        let reason = match data_store.get_my_seminar(user_id, seminar_number)? {
            Some(current) => format!(
                "User {} is already enrolled for seminar {} in round {}. Cancel it first.",
                user_id, current.id, seminar_number
            ),
            None => format!(
                "Seminar {} is not open in round {}",
                seminar_id, seminar_number
            ),
        };
        return Err(CliError::Rejected(reason));
    }
    println!(
        "Enrolled user {} for seminar {} in round {}",
        user_id, seminar_id, seminar_number
    );
    Ok(())
}

pub fn print_my_seminar(
    user_id: UserId,
    seminar_number: SeminarNumber,
    format: OutputFormat,
) -> Result<(), CliError> {
    let data_store_pool = get_store_from_env()?;
    let mut data_store = data_store_pool.get_facade()?;

    let seminar = data_store.get_my_seminar(user_id, seminar_number)?;
    if format == OutputFormat::Json {
        let seminar: Option<step_of_faith_api_types::Seminar> = seminar.map(|s| s.into());
        return print_json(&seminar);
    }
    match seminar {
        Some(seminar) => println!(
            "User {} is enrolled for seminar {} ({}) in round {}",
            user_id, seminar.id, seminar.title, seminar_number
        ),
        None => println!(
            "User {} is not enrolled for any seminar in round {}.",
            user_id, seminar_number
        ),
    }
    Ok(())
}

pub fn cancel_seminar(user_id: UserId, seminar_number: SeminarNumber) -> Result<(), CliError> {
    let data_store_pool = get_store_from_env()?;
    let mut data_store = data_store_pool.get_facade()?;

    data_store.cancel_seminar(user_id, seminar_number)?;
    println!(
        "Cancelled seminar enrollment of user {} in round {}",
        user_id, seminar_number
    );
    Ok(())
}
