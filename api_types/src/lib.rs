use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
}

#[derive(Serialize, Deserialize)]
pub struct ScheduleItem {
    pub time: NaiveTime,
    pub event: String,
}

#[derive(Serialize, Deserialize)]
pub struct Counselor {
    pub id: i32,
    pub name: String,
    pub place: String,
}

/// The counseling slot currently booked by a user, together with the counselor's details
#[derive(Serialize, Deserialize)]
pub struct CounselingBooking {
    #[serde(rename = "counselorName")]
    pub counselor_name: String,
    pub time: NaiveTime,
    pub place: String,
}

#[derive(Serialize, Deserialize)]
pub struct Seminar {
    pub id: i32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub speaker: String,
}

/// A seminar which currently accepts new enrollments in a specific round
#[derive(Serialize, Deserialize)]
pub struct OpenSeminar {
    pub id: i32,
    pub title: String,
}

/// Externally maintained master data, as read from a JSON file by the `load-data` command.
#[derive(Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub counselors: Vec<CatalogCounselor>,
    #[serde(default)]
    pub schedule: Vec<CatalogScheduleItem>,
    #[serde(default)]
    pub seminars: Vec<Seminar>,
    #[serde(default)]
    pub rounds: Vec<CatalogRound>,
}

#[derive(Serialize, Deserialize)]
pub struct CatalogCounselor {
    pub id: i32,
    pub name: String,
    pub place: String,
    /// Times of the counselor's bookable slots
    #[serde(default)]
    pub slots: Vec<NaiveTime>,
}

#[derive(Serialize, Deserialize)]
pub struct CatalogScheduleItem {
    pub day: i32,
    pub time: NaiveTime,
    pub event: String,
}

/// A seminar round with its start time and the rooms available in that round
#[derive(Serialize, Deserialize)]
pub struct CatalogRound {
    #[serde(rename = "seminarNumber")]
    pub seminar_number: i32,
    #[serde(rename = "startsAt")]
    pub starts_at: NaiveTime,
    #[serde(default)]
    pub spaces: Vec<CatalogSpace>,
}

#[derive(Serialize, Deserialize)]
pub struct CatalogSpace {
    pub room: String,
    pub capacity: i32,
}
