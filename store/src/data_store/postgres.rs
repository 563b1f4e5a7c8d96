use super::{
    models, schema, CounselorId, Day, RegistrationStore, RegistrationStoreFacade, SeminarId,
    SeminarNumber, StoreError, UserId, DEFAULT_SEMINAR_ROUNDS,
};
use crate::setup::DatabaseConfig;
use chrono::NaiveTime;
use diesel::dsl::{exists, not};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::ConnectionManager;
use diesel::sql_types::{BigInt, Integer};
use log::{debug, info};

#[derive(Clone)]
pub struct PgDataStore {
    pool: diesel::r2d2::Pool<diesel::r2d2::ConnectionManager<PgConnection>>,
}

impl PgDataStore {
    pub fn new(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let connection_manager = ConnectionManager::<PgConnection>::new(&config.url);
        Ok(Self {
            pool: diesel::r2d2::Pool::builder()
                .test_on_check_out(true)
                .max_size(config.pool_size)
                .min_idle(Some(config.pool_size.min(2)))
                .connection_timeout(config.connect_timeout)
                .build(connection_manager)?,
        })
    }
}

impl RegistrationStore for PgDataStore {
    fn get_facade<'a>(&'a self) -> Result<Box<dyn RegistrationStoreFacade + 'a>, StoreError> {
        Ok(Box::new(PgDataStoreFacade::with_pooled_connection(
            self.pool.get()?,
        )))
    }
}

pub struct PgDataStoreFacade {
    connection: diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>,
}

impl PgDataStoreFacade {
    pub fn with_pooled_connection(
        connection: diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>,
    ) -> Self {
        Self { connection }
    }
}

/// Common table expressions for the ranked matching of seminars and rooms of the seminar round
/// given as bind parameter `$1`. The last expression, `open_seminars (seminar_id, title)`,
/// contains the seminars which accept further enrollments.
///
/// See [super::allocation] for the rules. Room names are compared bytewise (`COLLATE "C"`), to
/// get the same tie-break as the in-memory implementation.
macro_rules! open_seminars_cte {
    () => {
        "WITH round_enrollment AS (
            SELECT user_id, seminar_id
            FROM step_of_faith.seminar_enrollment
            WHERE seminar_number = $1 AND seminar_id IS NOT NULL
        ),
        seminar_ranking AS (
            SELECT
                s.id AS seminar_id,
                s.title,
                COUNT(e.user_id) AS enrolled,
                ROW_NUMBER() OVER (ORDER BY COUNT(e.user_id) DESC, s.id ASC) AS rank_position
            FROM step_of_faith.seminars AS s
            LEFT JOIN round_enrollment AS e ON e.seminar_id = s.id
            GROUP BY s.id, s.title
        ),
        room_ranking AS (
            SELECT
                room,
                capacity,
                ROW_NUMBER() OVER (ORDER BY capacity DESC, room COLLATE \"C\" ASC) AS rank_position
            FROM step_of_faith.spaces
            WHERE seminar_number = $1
        ),
        open_seminars AS (
            SELECT s.seminar_id, s.title
            FROM seminar_ranking AS s
            JOIN room_ranking AS r ON r.rank_position = s.rank_position
            WHERE s.enrolled < r.capacity
        )
        "
    };
}

/// Binds: `$1` seminar round
const OPEN_SEMINARS_QUERY: &str = concat!(
    open_seminars_cte!(),
    "SELECT seminar_id AS id, title FROM open_seminars ORDER BY seminar_id"
);

/// Binds: `$1` seminar round, `$2` requested seminar id, `$3` user id
///
/// Only matches an unassigned enrollment, so that a seminar assignment can only be changed by
/// cancelling it first.
const ENROLL_IF_OPEN_STATEMENT: &str = concat!(
    open_seminars_cte!(),
    "UPDATE step_of_faith.seminar_enrollment AS enrollment
    SET seminar_id = o.seminar_id
    FROM open_seminars AS o
    WHERE o.seminar_id = $2
        AND enrollment.user_id = $3
        AND enrollment.seminar_number = $1
        AND enrollment.seminar_id IS NULL"
);

impl RegistrationStoreFacade for PgDataStoreFacade {
    fn register_user(&mut self, user: models::User) -> Result<(), StoreError> {
        self.connection.transaction::<_, StoreError, _>(|connection| {
            diesel::insert_into(schema::users::table)
                .values(&user)
                .execute(connection)?;

            let enrollments: Vec<models::SeminarEnrollment> = DEFAULT_SEMINAR_ROUNDS
                .iter()
                .map(|seminar_number| models::SeminarEnrollment {
                    user_id: user.id,
                    seminar_number: *seminar_number,
                    seminar_id: None,
                })
                .collect();
            diesel::insert_into(schema::seminar_enrollment::table)
                .values(&enrollments)
                .execute(connection)?;
            Ok(())
        })?;
        info!("Registered user {} ({})", user.id, user.username);
        Ok(())
    }

    fn user_exists(&mut self, the_user_id: UserId) -> Result<bool, StoreError> {
        use schema::users::dsl::*;

        diesel::select(exists(users.filter(id.eq(the_user_id))))
            .get_result::<bool>(&mut self.connection)
            .map_err(|e| e.into())
    }

    fn get_schedule_for_day(
        &mut self,
        the_day: Day,
    ) -> Result<Vec<models::ScheduleItem>, StoreError> {
        use schema::schedule::dsl::*;

        schedule
            .filter(day.eq(the_day))
            .order_by((time.asc(), id.asc()))
            .select(models::ScheduleItem::as_select())
            .load::<models::ScheduleItem>(&mut self.connection)
            .map_err(|e| e.into())
    }

    fn get_counselors(&mut self) -> Result<Vec<models::Counselor>, StoreError> {
        use schema::counselors::dsl::*;

        counselors
            .order_by(id.asc())
            .select(models::Counselor::as_select())
            .load::<models::Counselor>(&mut self.connection)
            .map_err(|e| e.into())
    }

    fn get_counselor(
        &mut self,
        counselor_id: CounselorId,
    ) -> Result<Option<models::Counselor>, StoreError> {
        use schema::counselors::dsl::*;

        counselors
            .filter(id.eq(counselor_id))
            .select(models::Counselor::as_select())
            .first::<models::Counselor>(&mut self.connection)
            .optional()
            .map_err(|e| e.into())
    }

    fn get_free_slots(
        &mut self,
        the_counselor_id: CounselorId,
    ) -> Result<Vec<NaiveTime>, StoreError> {
        use schema::counseling::dsl::*;

        counseling
            .filter(counselor_id.eq(the_counselor_id))
            .filter(user_id.is_null())
            .order_by(time.asc())
            .select(time)
            .load::<NaiveTime>(&mut self.connection)
            .map_err(|e| e.into())
    }

    fn book_counseling(
        &mut self,
        the_counselor_id: CounselorId,
        the_user_id: UserId,
        slot_time: NaiveTime,
    ) -> Result<bool, StoreError> {
        use schema::counseling::dsl::*;

        let result = self
            .connection
            .transaction::<_, BookingError, _>(|connection| {
                // Concurrent bookings of the same user must not both keep a slot, so they are
                // serialized by locking the user row.
                schema::users::table
                    .filter(schema::users::id.eq(the_user_id))
                    .select(schema::users::id)
                    .for_update()
                    .load::<UserId>(connection)?;

                let booked = diesel::update(counseling)
                    .filter(counselor_id.eq(the_counselor_id))
                    .filter(time.eq(slot_time))
                    .filter(user_id.is_null())
                    .set(user_id.eq(the_user_id))
                    .execute(connection)?;
                if booked == 0 {
                    return Err(BookingError::SlotUnavailable);
                }

                let released = diesel::update(counseling)
                    .filter(user_id.eq(the_user_id))
                    .filter(not(counselor_id
                        .eq(the_counselor_id)
                        .and(time.eq(slot_time))))
                    .set(user_id.eq(None::<UserId>))
                    .execute(connection)?;
                debug!(
                    "User {} booked counseling {} at {}, {} previous booking(s) released",
                    the_user_id, the_counselor_id, slot_time, released
                );
                Ok(())
            });

        match result {
            Ok(()) => Ok(true),
            Err(BookingError::SlotUnavailable) => {
                debug!(
                    "Counseling {} at {} is not available for user {}",
                    the_counselor_id, slot_time, the_user_id
                );
                Ok(false)
            }
            Err(BookingError::Store(e)) => Err(e),
        }
    }

    fn get_my_counseling(
        &mut self,
        the_user_id: UserId,
    ) -> Result<Option<models::CounselingBooking>, StoreError> {
        use schema::{counseling, counselors};

        counseling::table
            .inner_join(counselors::table)
            .filter(counseling::user_id.eq(the_user_id))
            .order_by(counseling::time.asc())
            .select((counselors::name, counseling::time, counselors::place))
            .first::<models::CounselingBooking>(&mut self.connection)
            .optional()
            .map_err(|e| e.into())
    }

    fn cancel_counseling(&mut self, the_user_id: UserId) -> Result<(), StoreError> {
        use schema::counseling::dsl::*;

        let released = diesel::update(counseling)
            .filter(user_id.eq(the_user_id))
            .set(user_id.eq(None::<UserId>))
            .execute(&mut self.connection)?;
        debug!(
            "Cancelled counseling of user {}: {} slot(s) released",
            the_user_id, released
        );
        Ok(())
    }

    fn get_open_seminars(
        &mut self,
        seminar_number: SeminarNumber,
    ) -> Result<Vec<models::OpenSeminar>, StoreError> {
        diesel::sql_query(OPEN_SEMINARS_QUERY)
            .bind::<Integer, _>(seminar_number)
            .load::<models::OpenSeminar>(&mut self.connection)
            .map_err(|e| e.into())
    }

    fn get_seminar(
        &mut self,
        seminar_id: SeminarId,
    ) -> Result<Option<models::Seminar>, StoreError> {
        use schema::seminars::dsl::*;

        seminars
            .filter(id.eq(seminar_id))
            .select(models::Seminar::as_select())
            .first::<models::Seminar>(&mut self.connection)
            .optional()
            .map_err(|e| e.into())
    }

    fn enroll_for_seminar(
        &mut self,
        seminar_number: SeminarNumber,
        user_id: UserId,
        seminar_id: SeminarId,
    ) -> Result<bool, StoreError> {
        let admitted = self.connection.transaction::<_, StoreError, _>(|connection| {
            // Concurrent admissions to the same round are serialized by locking the round's
            // rooms. Otherwise, two transactions could both take the last seat of a seminar,
            // because each of them only updates its own enrollment row.
            schema::spaces::table
                .filter(schema::spaces::seminar_number.eq(seminar_number))
                .select(schema::spaces::room)
                .for_update()
                .load::<String>(connection)?;

            let updated = diesel::sql_query(ENROLL_IF_OPEN_STATEMENT)
                .bind::<Integer, _>(seminar_number)
                .bind::<Integer, _>(seminar_id)
                .bind::<BigInt, _>(user_id)
                .execute(connection)?;
            Ok(updated > 0)
        })?;
        debug!(
            "Enrollment of user {} for seminar {} in round {}: {}",
            user_id,
            seminar_id,
            seminar_number,
            if admitted { "admitted" } else { "rejected" }
        );
        Ok(admitted)
    }

    fn get_my_seminar(
        &mut self,
        the_user_id: UserId,
        the_seminar_number: SeminarNumber,
    ) -> Result<Option<models::Seminar>, StoreError> {
        use schema::{seminar_enrollment, seminars};

        seminar_enrollment::table
            .inner_join(seminars::table)
            .filter(seminar_enrollment::user_id.eq(the_user_id))
            .filter(seminar_enrollment::seminar_number.eq(the_seminar_number))
            .select(models::Seminar::as_select())
            .first::<models::Seminar>(&mut self.connection)
            .optional()
            .map_err(|e| e.into())
    }

    fn cancel_seminar(
        &mut self,
        the_user_id: UserId,
        the_seminar_number: SeminarNumber,
    ) -> Result<(), StoreError> {
        use schema::seminar_enrollment::dsl::*;

        let updated = diesel::update(seminar_enrollment)
            .filter(user_id.eq(the_user_id))
            .filter(seminar_number.eq(the_seminar_number))
            .set(seminar_id.eq(None::<SeminarId>))
            .execute(&mut self.connection)?;
        debug!(
            "Cancelled seminar of user {} in round {} ({} enrollment(s) reset)",
            the_user_id, the_seminar_number, updated
        );
        Ok(())
    }

    fn get_seminar_start_time(
        &mut self,
        the_seminar_number: SeminarNumber,
    ) -> Result<Option<NaiveTime>, StoreError> {
        use schema::seminar_numbers::dsl::*;

        seminar_numbers
            .filter(seminar_number.eq(the_seminar_number))
            .select(starts_at)
            .first::<NaiveTime>(&mut self.connection)
            .optional()
            .map_err(|e| e.into())
    }

    fn import_catalog(&mut self, catalog: models::Catalog) -> Result<(), StoreError> {
        self.connection.transaction::<_, StoreError, _>(|connection| {
            // Referenced tables first
            if !catalog.counselors.is_empty() {
                diesel::insert_into(schema::counselors::table)
                    .values(&catalog.counselors)
                    .execute(connection)?;
            }
            if !catalog.slots.is_empty() {
                diesel::insert_into(schema::counseling::table)
                    .values(&catalog.slots)
                    .execute(connection)?;
            }
            if !catalog.schedule.is_empty() {
                diesel::insert_into(schema::schedule::table)
                    .values(&catalog.schedule)
                    .execute(connection)?;
            }
            if !catalog.seminars.is_empty() {
                diesel::insert_into(schema::seminars::table)
                    .values(&catalog.seminars)
                    .execute(connection)?;
            }
            if !catalog.rounds.is_empty() {
                diesel::insert_into(schema::seminar_numbers::table)
                    .values(&catalog.rounds)
                    .execute(connection)?;
            }
            if !catalog.spaces.is_empty() {
                diesel::insert_into(schema::spaces::table)
                    .values(&catalog.spaces)
                    .execute(connection)?;
            }
            Ok(())
        })?;
        info!(
            "Imported {} counselors with {} slots, {} schedule items, {} seminars and {} rounds with {} spaces",
            catalog.counselors.len(),
            catalog.slots.len(),
            catalog.schedule.len(),
            catalog.seminars.len(),
            catalog.rounds.len(),
            catalog.spaces.len()
        );
        Ok(())
    }
}

/// Error type of the booking transaction. An unavailable slot is an expected outcome, but it
/// must still roll back the transaction, so it is transported as transaction error.
enum BookingError {
    SlotUnavailable,
    Store(StoreError),
}

impl From<diesel::result::Error> for BookingError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Store(error.into())
    }
}
