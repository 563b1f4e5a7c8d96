use crate::data_store::allocation::{self, RoomCapacity, SeminarLoad};
use crate::data_store::{
    models, CounselorId, Day, RegistrationStore, RegistrationStoreFacade, SeminarId,
    SeminarNumber, StoreError, UserId, DEFAULT_SEMINAR_ROUNDS,
};
use chrono::NaiveTime;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/**
 * A mock [RegistrationStore] implementation for testing.
 *
 * The simulated database consists of the [StoreMockData] structure with vectors of table rows.
 * These can be directly modified by the tests.
 *
 * Each facade call holds the mutex for its whole duration, which makes every call atomic, like a
 * transaction. Uniqueness and reference constraints are only checked as far as the tests need
 * them. The [StoreMockData::next_error] attribute can be set to simulate a database error.
 */
#[derive(Default)]
pub struct StoreMock {
    pub data: Mutex<StoreMockData>,
}

impl RegistrationStore for StoreMock {
    fn get_facade<'a>(&'a self) -> Result<Box<dyn RegistrationStoreFacade + 'a>, StoreError> {
        Ok(Box::new(StoreMockFacade { store: self }))
    }
}

#[derive(Default)]
pub struct StoreMockData {
    pub users: Vec<models::User>,
    pub counselors: Vec<models::Counselor>,
    pub slots: Vec<models::CounselingSlot>,
    pub schedule: Vec<models::ScheduleItem>,
    pub seminars: Vec<models::Seminar>,
    pub enrollments: Vec<models::SeminarEnrollment>,
    pub rounds: Vec<models::SeminarRound>,
    pub spaces: Vec<models::Space>,
    /// If not none, the next call to a store facade method will return this error.
    pub next_error: Option<StoreError>,
}

impl StoreMockData {
    fn open_seminar_ids(&self, seminar_number: SeminarNumber) -> Vec<SeminarId> {
        let loads: Vec<SeminarLoad> = self
            .seminars
            .iter()
            .map(|seminar| SeminarLoad {
                seminar_id: seminar.id,
                enrolled: self
                    .enrollments
                    .iter()
                    .filter(|e| {
                        e.seminar_number == seminar_number && e.seminar_id == Some(seminar.id)
                    })
                    .count() as i64,
            })
            .collect();
        let rooms: Vec<RoomCapacity> = self
            .spaces
            .iter()
            .filter(|s| s.seminar_number == seminar_number)
            .map(|s| RoomCapacity {
                room: s.room.clone(),
                capacity: s.capacity,
            })
            .collect();
        allocation::open_seminars(&loads, &rooms)
    }

    fn check_catalog(&self, catalog: &models::Catalog) -> Result<(), StoreError> {
        fn all_unique<K: Eq + std::hash::Hash>(
            existing: impl Iterator<Item = K>,
            new: impl Iterator<Item = K>,
        ) -> bool {
            let mut keys = HashSet::new();
            existing.chain(new).all(|k| keys.insert(k))
        }

        if !all_unique(
            self.counselors.iter().map(|c| c.id),
            catalog.counselors.iter().map(|c| c.id),
        ) || !all_unique(
            self.slots.iter().map(|s| (s.counselor_id, s.time)),
            catalog.slots.iter().map(|s| (s.counselor_id, s.time)),
        ) || !all_unique(
            self.seminars.iter().map(|s| s.id),
            catalog.seminars.iter().map(|s| s.id),
        ) || !all_unique(
            self.rounds.iter().map(|r| r.seminar_number),
            catalog.rounds.iter().map(|r| r.seminar_number),
        ) || !all_unique(
            self.spaces.iter().map(|s| (s.room.clone(), s.seminar_number)),
            catalog
                .spaces
                .iter()
                .map(|s| (s.room.clone(), s.seminar_number)),
        ) {
            return Err(StoreError::ConflictEntityExists);
        }
        if catalog.spaces.iter().any(|s| s.capacity < 0) {
            return Err(StoreError::InvalidInputData(
                "CheckViolation: spaces_capacity_non_negative".to_string(),
            ));
        }
        Ok(())
    }
}

struct StoreMockFacade<'a> {
    store: &'a StoreMock,
}

impl<'a> StoreMockFacade<'a> {
    fn data(&self) -> Result<MutexGuard<'a, StoreMockData>, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        Ok(data)
    }
}

impl<'a> RegistrationStoreFacade for StoreMockFacade<'a> {
    fn register_user(&mut self, user: models::User) -> Result<(), StoreError> {
        let mut data = self.data()?;
        if data.users.iter().any(|u| u.id == user.id) {
            return Err(StoreError::ConflictEntityExists);
        }
        data.enrollments
            .extend(
                DEFAULT_SEMINAR_ROUNDS
                    .iter()
                    .map(|seminar_number| models::SeminarEnrollment {
                        user_id: user.id,
                        seminar_number: *seminar_number,
                        seminar_id: None,
                    }),
            );
        data.users.push(user);
        Ok(())
    }

    fn user_exists(&mut self, user_id: UserId) -> Result<bool, StoreError> {
        let data = self.data()?;
        Ok(data.users.iter().any(|u| u.id == user_id))
    }

    fn get_schedule_for_day(&mut self, day: Day) -> Result<Vec<models::ScheduleItem>, StoreError> {
        let data = self.data()?;
        let mut result: Vec<models::ScheduleItem> = data
            .schedule
            .iter()
            .filter(|item| item.day == day)
            .cloned()
            .collect();
        result.sort_by_key(|item| item.time);
        Ok(result)
    }

    fn get_counselors(&mut self) -> Result<Vec<models::Counselor>, StoreError> {
        let data = self.data()?;
        let mut result = data.counselors.clone();
        result.sort_by_key(|c| c.id);
        Ok(result)
    }

    fn get_counselor(
        &mut self,
        counselor_id: CounselorId,
    ) -> Result<Option<models::Counselor>, StoreError> {
        let data = self.data()?;
        Ok(data
            .counselors
            .iter()
            .find(|c| c.id == counselor_id)
            .cloned())
    }

    fn get_free_slots(&mut self, counselor_id: CounselorId) -> Result<Vec<NaiveTime>, StoreError> {
        let data = self.data()?;
        let mut result: Vec<NaiveTime> = data
            .slots
            .iter()
            .filter(|s| s.counselor_id == counselor_id && s.user_id.is_none())
            .map(|s| s.time)
            .collect();
        result.sort();
        Ok(result)
    }

    fn book_counseling(
        &mut self,
        counselor_id: CounselorId,
        user_id: UserId,
        time: NaiveTime,
    ) -> Result<bool, StoreError> {
        let mut data = self.data()?;
        let Some(index) = data
            .slots
            .iter()
            .position(|s| s.counselor_id == counselor_id && s.time == time && s.user_id.is_none())
        else {
            return Ok(false);
        };
        if !data.users.iter().any(|u| u.id == user_id) {
            return Err(StoreError::InvalidInputData(
                "ForeignKeyViolation: counseling_user_id_fkey".to_string(),
            ));
        }
        for (i, slot) in data.slots.iter_mut().enumerate() {
            if i == index {
                slot.user_id = Some(user_id);
            } else if slot.user_id == Some(user_id) {
                slot.user_id = None;
            }
        }
        Ok(true)
    }

    fn get_my_counseling(
        &mut self,
        user_id: UserId,
    ) -> Result<Option<models::CounselingBooking>, StoreError> {
        let data = self.data()?;
        Ok(data
            .slots
            .iter()
            .filter(|s| s.user_id == Some(user_id))
            .min_by_key(|s| s.time)
            .and_then(|slot| {
                data.counselors
                    .iter()
                    .find(|c| c.id == slot.counselor_id)
                    .map(|counselor| models::CounselingBooking {
                        counselor_name: counselor.name.clone(),
                        time: slot.time,
                        place: counselor.place.clone(),
                    })
            }))
    }

    fn cancel_counseling(&mut self, user_id: UserId) -> Result<(), StoreError> {
        let mut data = self.data()?;
        for slot in data.slots.iter_mut() {
            if slot.user_id == Some(user_id) {
                slot.user_id = None;
            }
        }
        Ok(())
    }

    fn get_open_seminars(
        &mut self,
        seminar_number: SeminarNumber,
    ) -> Result<Vec<models::OpenSeminar>, StoreError> {
        let data = self.data()?;
        Ok(data
            .open_seminar_ids(seminar_number)
            .into_iter()
            .filter_map(|seminar_id| data.seminars.iter().find(|s| s.id == seminar_id))
            .map(|s| models::OpenSeminar {
                id: s.id,
                title: s.title.clone(),
            })
            .collect())
    }

    fn get_seminar(
        &mut self,
        seminar_id: SeminarId,
    ) -> Result<Option<models::Seminar>, StoreError> {
        let data = self.data()?;
        Ok(data.seminars.iter().find(|s| s.id == seminar_id).cloned())
    }

    fn enroll_for_seminar(
        &mut self,
        seminar_number: SeminarNumber,
        user_id: UserId,
        seminar_id: SeminarId,
    ) -> Result<bool, StoreError> {
        let mut data = self.data()?;
        if !data.open_seminar_ids(seminar_number).contains(&seminar_id) {
            return Ok(false);
        }
        match data.enrollments.iter_mut().find(|e| {
            e.user_id == user_id && e.seminar_number == seminar_number && e.seminar_id.is_none()
        }) {
            Some(enrollment) => {
                enrollment.seminar_id = Some(seminar_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn get_my_seminar(
        &mut self,
        user_id: UserId,
        seminar_number: SeminarNumber,
    ) -> Result<Option<models::Seminar>, StoreError> {
        let data = self.data()?;
        Ok(data
            .enrollments
            .iter()
            .find(|e| e.user_id == user_id && e.seminar_number == seminar_number)
            .and_then(|e| e.seminar_id)
            .and_then(|seminar_id| data.seminars.iter().find(|s| s.id == seminar_id))
            .cloned())
    }

    fn cancel_seminar(
        &mut self,
        user_id: UserId,
        seminar_number: SeminarNumber,
    ) -> Result<(), StoreError> {
        let mut data = self.data()?;
        for enrollment in data.enrollments.iter_mut() {
            if enrollment.user_id == user_id && enrollment.seminar_number == seminar_number {
                enrollment.seminar_id = None;
            }
        }
        Ok(())
    }

    fn get_seminar_start_time(
        &mut self,
        seminar_number: SeminarNumber,
    ) -> Result<Option<NaiveTime>, StoreError> {
        let data = self.data()?;
        Ok(data
            .rounds
            .iter()
            .find(|r| r.seminar_number == seminar_number)
            .map(|r| r.starts_at))
    }

    fn import_catalog(&mut self, catalog: models::Catalog) -> Result<(), StoreError> {
        let mut data = self.data()?;
        data.check_catalog(&catalog)?;
        data.counselors.extend(catalog.counselors);
        data.slots.extend(catalog.slots);
        data.schedule.extend(catalog.schedule);
        data.seminars.extend(catalog.seminars);
        data.rounds.extend(catalog.rounds);
        data.spaces.extend(catalog.spaces);
        Ok(())
    }
}
