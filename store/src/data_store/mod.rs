//! The database interface of the registration application
//!
//! The primary entry point to this module is the function [get_store_from_env], which returns an
//! object implementing the [RegistrationStore] trait. This object can be shared between threads
//! and be used to create [RegistrationStoreFacade] instances for interaction with the database.
//! Each facade holds one connection for its lifetime and gives it back when dropped.
//!
//! The primary implementation of [RegistrationStore] ([postgres::PgDataStore]) wraps a PostgreSQL
//! connection pool, using the Diesel query DSL for the simple lookups and hand-written SQL for
//! the seminar ranking. The mock implementation in [store_mock] simulates the same semantics in
//! memory for unittests.
//!
//! Two operations carry the interesting invariants:
//! * [RegistrationStoreFacade::book_counseling] guarantees that a slot gets at most one occupant
//!   and that a user holds at most one slot.
//! * [RegistrationStoreFacade::enroll_for_seminar] only admits a user to a seminar which is
//!   *open*, according to the ranked matching of seminars and rooms described in [allocation].

use crate::cli_error::CliError;
use crate::setup;
use chrono::NaiveTime;

pub mod allocation;
pub mod models;
mod postgres;
mod schema;
#[cfg(test)]
pub mod store_mock;

/// Get a [RegistrationStore] instance, according to the "DATABASE_URL" environment variable and
/// the optional connection pool settings (see [setup::get_database_config_from_env]).
///
/// The DATABASE_URL must be a PosgreSQL connection url, following the schema
/// "postgres://{user}:{password}@{host}/{database}".
pub fn get_store_from_env() -> Result<impl RegistrationStore, CliError> {
    Ok(postgres::PgDataStore::new(
        &setup::get_database_config_from_env()?,
    )?)
}

pub type UserId = i64;
pub type CounselorId = i32;
pub type SeminarId = i32;
/// Identifier of a seminar round
pub type SeminarNumber = i32;
pub type Day = i32;

/// Seminar rounds for which a placeholder enrollment is created on registration
pub const DEFAULT_SEMINAR_ROUNDS: [SeminarNumber; 2] = [1, 2];

pub trait RegistrationStoreFacade {
    /// Create a new user, together with the (unassigned) enrollments for the
    /// [DEFAULT_SEMINAR_ROUNDS].
    ///
    /// Returns `Err(StoreError::ConflictEntityExists)` if the user is registered already.
    fn register_user(&mut self, user: models::User) -> Result<(), StoreError>;
    fn user_exists(&mut self, user_id: UserId) -> Result<bool, StoreError>;

    /// Get the schedule of the given day, ordered by time
    fn get_schedule_for_day(&mut self, day: Day) -> Result<Vec<models::ScheduleItem>, StoreError>;

    /// Get all counselors, ordered by id
    fn get_counselors(&mut self) -> Result<Vec<models::Counselor>, StoreError>;
    fn get_counselor(
        &mut self,
        counselor_id: CounselorId,
    ) -> Result<Option<models::Counselor>, StoreError>;
    /// Get the times of all unoccupied slots of the counselor, ordered by time
    fn get_free_slots(&mut self, counselor_id: CounselorId) -> Result<Vec<NaiveTime>, StoreError>;

    /// Book the counseling slot (`counselor_id`, `time`) for the user.
    ///
    /// The slot is only taken if it is free. In this case, any other slot held by the user is
    /// released in the same transaction, such that the user holds exactly the new slot afterwards.
    ///
    /// # return value
    /// - `Ok(true)` if the slot has been booked for the user
    /// - `Ok(false)` if the slot is occupied or does not exist. Nothing has been changed.
    /// - `Err(_)` if something different went wrong, as usual
    fn book_counseling(
        &mut self,
        counselor_id: CounselorId,
        user_id: UserId,
        time: NaiveTime,
    ) -> Result<bool, StoreError>;
    fn get_my_counseling(
        &mut self,
        user_id: UserId,
    ) -> Result<Option<models::CounselingBooking>, StoreError>;
    /// Release any counseling slot held by the user. Does nothing if there is none.
    fn cancel_counseling(&mut self, user_id: UserId) -> Result<(), StoreError>;

    /// Get the seminars which are currently open for new enrollments in the given round, ordered
    /// by seminar id
    fn get_open_seminars(
        &mut self,
        seminar_number: SeminarNumber,
    ) -> Result<Vec<models::OpenSeminar>, StoreError>;
    fn get_seminar(&mut self, seminar_id: SeminarId)
        -> Result<Option<models::Seminar>, StoreError>;

    /// Admit the user to the seminar in the given round, if the seminar is currently open.
    ///
    /// Openness check and enrollment are done by a single conditional write. Only an unassigned
    /// enrollment is updated: a user who is already assigned to a seminar in this round must
    /// cancel it first.
    ///
    /// # return value
    /// - `Ok(true)` if the user has been admitted
    /// - `Ok(false)` if the seminar is not open, or the user has no unassigned enrollment for the
    ///   round. Nothing has been changed.
    /// - `Err(_)` if something different went wrong, as usual
    fn enroll_for_seminar(
        &mut self,
        seminar_number: SeminarNumber,
        user_id: UserId,
        seminar_id: SeminarId,
    ) -> Result<bool, StoreError>;
    /// Get the seminar the user is assigned to in the given round, if any
    fn get_my_seminar(
        &mut self,
        user_id: UserId,
        seminar_number: SeminarNumber,
    ) -> Result<Option<models::Seminar>, StoreError>;
    /// Reset the user's enrollment of the round to unassigned. Does nothing if it is unassigned
    /// already.
    fn cancel_seminar(
        &mut self,
        user_id: UserId,
        seminar_number: SeminarNumber,
    ) -> Result<(), StoreError>;
    fn get_seminar_start_time(
        &mut self,
        seminar_number: SeminarNumber,
    ) -> Result<Option<NaiveTime>, StoreError>;

    /// Insert the given master data in a single transaction
    fn import_catalog(&mut self, catalog: models::Catalog) -> Result<(), StoreError>;
}

pub trait RegistrationStore: Send + Sync {
    fn get_facade<'a>(&'a self) -> Result<Box<dyn RegistrationStoreFacade + 'a>, StoreError>;
}

#[derive(Debug)]
pub enum StoreError {
    /// Connection the database failed. See string description for details.
    ConnectionError(String),
    /// The query could not be executed because of some error not covered by the other members (see
    /// string description)
    QueryError(diesel::result::Error),
    /// Database transaction could not be commited due to a conflicting concurrent transaction
    TransactionConflict,
    /// The requested entity does not exist
    NotExisting,
    /// The entity could not be created because it already exists.
    ConflictEntityExists,
    /// The provided data is invalid, i.e. it does not match the expected ranges or violates a
    /// SQL constraint. See string description for details.
    InvalidInputData(String),
    /// Some data queried from the database could not be deserialized. See string description for
    /// details.
    InvalidDataInDatabase(String),
}

impl From<diesel::result::Error> for StoreError {
    fn from(error: diesel::result::Error) -> Self {
        match error {
            diesel::result::Error::NotFound => Self::NotExisting,
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => Self::ConflictEntityExists,
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::SerializationFailure,
                _,
            ) => Self::TransactionConflict,
            diesel::result::Error::DatabaseError(
                e @ diesel::result::DatabaseErrorKind::ForeignKeyViolation
                | e @ diesel::result::DatabaseErrorKind::CheckViolation
                | e @ diesel::result::DatabaseErrorKind::NotNullViolation,
                info,
            ) => Self::InvalidInputData(format!("{:?}: {}", e, info.message())),
            diesel::result::Error::SerializationError(e) => Self::InvalidInputData(e.to_string()),
            diesel::result::Error::DeserializationError(e) => {
                Self::InvalidDataInDatabase(e.to_string())
            }
            _ => Self::QueryError(error),
        }
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(error: r2d2::Error) -> Self {
        Self::ConnectionError(error.to_string())
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Error connecting to database: {}", e),
            Self::QueryError(e) => write!(f, "Error while executing database query: {}", e),
            Self::TransactionConflict => f.write_str("Database transaction could not be commited due to a conflicting concurrent transaction"),
            Self::NotExisting => f.write_str("Database record does not exist."),
            Self::ConflictEntityExists => f.write_str("Database record exists already."),
            Self::InvalidInputData(e) => {
                write!(f, "Data to be stored in database is not valid: {}", e)
            }
            Self::InvalidDataInDatabase(e) => {
                write!(f, "Data queried from database could not be deserialized: {}", e)
            }
        }
    }
}

impl std::error::Error for StoreError {}
