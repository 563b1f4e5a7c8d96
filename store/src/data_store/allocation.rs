//! The ranked matching of seminars and rooms within one seminar round
//!
//! Seminars are ranked by their current number of enrolled participants (descending) and rooms
//! are ranked by their capacity (descending). The seminar of rank k is assigned to the room of
//! rank k, i.e. the most popular seminar takes place in the largest room. A seminar is *open* for
//! further enrollments iff its paired room's capacity is strictly greater than its current
//! enrollment count. Seminars without a paired room (more seminars than rooms in the round) are
//! never open.
//!
//! Ties are broken deterministically: seminars with equal counts by ascending seminar id, rooms
//! with equal capacity by ascending room name. The PostgreSQL implementation expresses exactly
//! this ordering in its `ROW_NUMBER()` window clauses (see the `open_seminars_cte` macro in the
//! postgres module). This module is the in-memory rendition, used by the mock store and for verifying the
//! matching rules in isolation.

use crate::data_store::SeminarId;

/// Current enrollment count of a seminar in one round
#[derive(Clone, Debug, PartialEq)]
pub struct SeminarLoad {
    pub seminar_id: SeminarId,
    pub enrolled: i64,
}

/// A room available in one round
#[derive(Clone, Debug, PartialEq)]
pub struct RoomCapacity {
    pub room: String,
    pub capacity: i32,
}

/// A seminar together with the room it is paired with by the ranking
#[derive(Clone, Debug, PartialEq)]
pub struct Pairing {
    pub seminar_id: SeminarId,
    pub enrolled: i64,
    pub room: String,
    pub capacity: i32,
}

impl Pairing {
    pub fn is_open(&self) -> bool {
        self.enrolled < i64::from(self.capacity)
    }
}

/// Rank seminars and rooms and pair them up by rank.
///
/// The result is ordered by rank, i.e. the first pairing is the most popular seminar with the
/// largest room. Seminars which don't get a room are omitted.
pub fn pair_seminars_with_rooms(seminars: &[SeminarLoad], rooms: &[RoomCapacity]) -> Vec<Pairing> {
    let mut seminars: Vec<&SeminarLoad> = seminars.iter().collect();
    seminars.sort_by(|a, b| {
        b.enrolled
            .cmp(&a.enrolled)
            .then(a.seminar_id.cmp(&b.seminar_id))
    });
    let mut rooms: Vec<&RoomCapacity> = rooms.iter().collect();
    rooms.sort_by(|a, b| b.capacity.cmp(&a.capacity).then(a.room.cmp(&b.room)));

    seminars
        .into_iter()
        .zip(rooms)
        .map(|(seminar, room)| Pairing {
            seminar_id: seminar.seminar_id,
            enrolled: seminar.enrolled,
            room: room.room.clone(),
            capacity: room.capacity,
        })
        .collect()
}

/// Get the ids of all open seminars, in ascending order
pub fn open_seminars(seminars: &[SeminarLoad], rooms: &[RoomCapacity]) -> Vec<SeminarId> {
    let mut result: Vec<SeminarId> = pair_seminars_with_rooms(seminars, rooms)
        .into_iter()
        .filter(Pairing::is_open)
        .map(|p| p.seminar_id)
        .collect();
    result.sort();
    result
}
