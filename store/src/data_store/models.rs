use crate::data_store::{CounselorId, Day, SeminarId, SeminarNumber, UserId};
use chrono::NaiveTime;
use diesel::prelude::*;

#[derive(Clone, Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name=super::schema::users)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

impl From<User> for step_of_faith_api_types::User {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            username: value.username,
        }
    }
}

#[derive(Clone, Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name=super::schema::counselors)]
pub struct Counselor {
    pub id: CounselorId,
    pub name: String,
    pub place: String,
}

impl From<Counselor> for step_of_faith_api_types::Counselor {
    fn from(value: Counselor) -> Self {
        Self {
            id: value.id,
            name: value.name,
            place: value.place,
        }
    }
}

/// A bookable (counselor, time) pair. The slot is free iff `user_id` is None.
#[derive(Clone, Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name=super::schema::counseling)]
pub struct CounselingSlot {
    pub counselor_id: CounselorId,
    pub time: NaiveTime,
    pub user_id: Option<UserId>,
}

/// A user's current counseling booking, joined with the counselor's data
#[derive(Clone, Debug, PartialEq, Queryable)]
pub struct CounselingBooking {
    pub counselor_name: String,
    pub time: NaiveTime,
    pub place: String,
}

impl From<CounselingBooking> for step_of_faith_api_types::CounselingBooking {
    fn from(value: CounselingBooking) -> Self {
        Self {
            counselor_name: value.counselor_name,
            time: value.time,
            place: value.place,
        }
    }
}

#[derive(Clone, Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name=super::schema::schedule)]
pub struct ScheduleItem {
    pub day: Day,
    pub time: NaiveTime,
    pub event: String,
}

impl From<ScheduleItem> for step_of_faith_api_types::ScheduleItem {
    fn from(value: ScheduleItem) -> Self {
        Self {
            time: value.time,
            event: value.event,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Queryable, Selectable, Insertable)]
#[diesel(table_name=super::schema::seminars)]
pub struct Seminar {
    pub id: SeminarId,
    pub title: String,
    pub description: String,
    pub speaker: String,
}

impl From<step_of_faith_api_types::Seminar> for Seminar {
    fn from(value: step_of_faith_api_types::Seminar) -> Self {
        Self {
            id: value.id,
            title: value.title,
            description: value.description,
            speaker: value.speaker,
        }
    }
}

impl From<Seminar> for step_of_faith_api_types::Seminar {
    fn from(value: Seminar) -> Self {
        Self {
            id: value.id,
            title: value.title,
            description: value.description,
            speaker: value.speaker,
        }
    }
}

/// A seminar that currently accepts enrollments in some round. Used as result row of the raw
/// ranking query, hence `QueryableByName`.
#[derive(Clone, Debug, PartialEq, QueryableByName)]
#[diesel(table_name=super::schema::seminars)]
pub struct OpenSeminar {
    pub id: SeminarId,
    pub title: String,
}

impl From<OpenSeminar> for step_of_faith_api_types::OpenSeminar {
    fn from(value: OpenSeminar) -> Self {
        Self {
            id: value.id,
            title: value.title,
        }
    }
}

/// A user's enrollment in one seminar round. `seminar_id` is None until the user has been
/// admitted to a seminar.
#[derive(Clone, Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name=super::schema::seminar_enrollment)]
pub struct SeminarEnrollment {
    pub user_id: UserId,
    pub seminar_number: SeminarNumber,
    pub seminar_id: Option<SeminarId>,
}

/// A room with its capacity in a specific seminar round
#[derive(Clone, Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name=super::schema::spaces)]
pub struct Space {
    pub room: String,
    pub capacity: i32,
    pub seminar_number: SeminarNumber,
}

#[derive(Clone, Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name=super::schema::seminar_numbers)]
pub struct SeminarRound {
    pub seminar_number: SeminarNumber,
    pub starts_at: NaiveTime,
}

/// The externally maintained master data, flattened into table rows for import.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub counselors: Vec<Counselor>,
    pub slots: Vec<CounselingSlot>,
    pub schedule: Vec<ScheduleItem>,
    pub seminars: Vec<Seminar>,
    pub rounds: Vec<SeminarRound>,
    pub spaces: Vec<Space>,
}

impl From<step_of_faith_api_types::Catalog> for Catalog {
    fn from(value: step_of_faith_api_types::Catalog) -> Self {
        let mut result = Catalog::default();
        for counselor in value.counselors {
            result
                .slots
                .extend(counselor.slots.iter().map(|time| CounselingSlot {
                    counselor_id: counselor.id,
                    time: *time,
                    user_id: None,
                }));
            result.counselors.push(Counselor {
                id: counselor.id,
                name: counselor.name,
                place: counselor.place,
            });
        }
        result.schedule = value
            .schedule
            .into_iter()
            .map(|item| ScheduleItem {
                day: item.day,
                time: item.time,
                event: item.event,
            })
            .collect();
        result.seminars = value.seminars.into_iter().map(Seminar::from).collect();
        for round in value.rounds {
            result
                .spaces
                .extend(round.spaces.into_iter().map(|space| Space {
                    room: space.room,
                    capacity: space.capacity,
                    seminar_number: round.seminar_number,
                }));
            result.rounds.push(SeminarRound {
                seminar_number: round.seminar_number,
                starts_at: round.starts_at,
            });
        }
        result
    }
}
