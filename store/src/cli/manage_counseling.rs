use crate::cli::manage_users::ensure_user_exists;
use crate::cli::{new_table, print_json, OutputFormat};
use crate::cli_error::CliError;
use crate::data_store::{get_store_from_env, RegistrationStore};
use crate::data_store::{CounselorId, UserId};
use chrono::NaiveTime;

pub fn print_counselor_list(format: OutputFormat) -> Result<(), CliError> {
    let data_store_pool = get_store_from_env()?;
    let mut data_store = data_store_pool.get_facade()?;

    let counselors = data_store.get_counselors()?;
    if format == OutputFormat::Json {
        let counselors: Vec<step_of_faith_api_types::Counselor> =
            counselors.into_iter().map(|c| c.into()).collect();
        return print_json(&counselors);
    }

    let mut table = new_table();
    table
        .set_header(vec!["id", "name", "place"])
        .add_rows(
            counselors
                .into_iter()
                .map(|counselor| [counselor.id.to_string(), counselor.name, counselor.place]),
        );

    println!("{table}");
    Ok(())
}

pub fn print_free_slots(counselor_id: CounselorId, format: OutputFormat) -> Result<(), CliError> {
    let data_store_pool = get_store_from_env()?;
    let mut data_store = data_store_pool.get_facade()?;

    let counselor = data_store.get_counselor(counselor_id)?.ok_or_else(|| {
        CliError::DataError(format!("Counselor {} does not exist", counselor_id))
    })?;
    let slots = data_store.get_free_slots(counselor_id)?;
    if format == OutputFormat::Json {
        return print_json(&slots);
    }

    if slots.is_empty() {
        println!("{} ({}) has no free slots.", counselor.name, counselor.place);
    } else {
        println!(
            "Free slots of {} ({}): {}",
            counselor.name,
            counselor.place,
            slots
                .iter()
                .map(|time| time.format("%H:%M").to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(())
}

pub fn book_counseling(
    counselor_id: CounselorId,
    user_id: UserId,
    time: NaiveTime,
) -> Result<(), CliError> {
    let data_store_pool = get_store_from_env()?;
    let mut data_store = data_store_pool.get_facade()?;

    ensure_user_exists(&mut *data_store, user_id)?;
    if !data_store.book_counseling(counselor_id, user_id, time)? {
        return Err(CliError::Rejected(format!(
            "Slot {} of counselor {} is not available",
            time.format("%H:%M"),
            counselor_id
        )));
    }
    println!(
        "Booked counseling {} at {} for user {}",
        counselor_id,
        time.format("%H:%M"),
        user_id
    );
    Ok(())
}

pub fn print_my_counseling(user_id: UserId, format: OutputFormat) -> Result<(), CliError> {
    let data_store_pool = get_store_from_env()?;
    let mut data_store = data_store_pool.get_facade()?;

    let booking = data_store.get_my_counseling(user_id)?;
    if format == OutputFormat::Json {
        let booking: Option<step_of_faith_api_types::CounselingBooking> =
            booking.map(|b| b.into());
        return print_json(&booking);
    }
    match booking {
        Some(booking) => println!(
            "User {} has counseling with {} at {} in {}",
            user_id,
            booking.counselor_name,
            booking.time.format("%H:%M"),
            booking.place
        ),
        None => println!("User {} has no counseling booked.", user_id),
    }
    Ok(())
}

pub fn cancel_counseling(user_id: UserId) -> Result<(), CliError> {
    let data_store_pool = get_store_from_env()?;
    let mut data_store = data_store_pool.get_facade()?;

    data_store.cancel_counseling(user_id)?;
    println!("Cancelled counseling of user {}", user_id);
    Ok(())
}
