// libs/availability-cell/src/services/slots.rs
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::models::{BookedRange, Practitioner, SchedulingConfig, Slot};
use crate::services::schedule::WorkSchedule;

/// Expands a practitioner's weekly schedule into concrete dated slots over a
/// rolling horizon, subtracting everything that collides with the ledger.
///
/// Pure compute: the caller supplies the booked ranges and the current
/// instant, so the same inputs always produce the same slots.
pub struct SlotGenerator {
    slot_duration: Duration,
    horizon_days: i64,
}

impl SlotGenerator {
    pub fn new(config: &SchedulingConfig) -> Self {
        Self {
            slot_duration: Duration::minutes(config.slot_duration_minutes),
            horizon_days: config.horizon_days,
        }
    }

    pub fn slot_duration(&self) -> Duration {
        self.slot_duration
    }

    pub fn horizon_days(&self) -> i64 {
        self.horizon_days
    }

    /// The calendar dates of the horizon, day zero first.
    pub fn horizon_dates(&self, today: NaiveDate) -> Vec<NaiveDate> {
        (0..self.horizon_days)
            .map(|offset| today + Duration::days(offset))
            .collect()
    }

    /// All free slots of one practitioner across the whole horizon.
    ///
    /// A day whose stored interval fails validation contributes zero slots
    /// and is logged; the remaining days still generate. One defective
    /// record must not blank out a practitioner's whole availability.
    pub fn expand_horizon(
        &self,
        practitioner: &Practitioner,
        service_id: Uuid,
        booked: &[BookedRange],
        now: DateTime<Utc>,
    ) -> Vec<Slot> {
        let schedule = WorkSchedule::new(&practitioner.work_hours);
        let mut slots = Vec::new();

        for date in self.horizon_dates(now.date_naive()) {
            match self.slots_for_day(practitioner, service_id, &schedule, date, booked, now) {
                Ok(day_slots) => slots.extend(day_slots),
                Err(e) => {
                    warn!(
                        "Skipping {} for practitioner {}: {}",
                        date, practitioner.id, e
                    );
                }
            }
        }

        slots
    }

    /// Free slots of one practitioner on one calendar day.
    pub fn slots_for_day(
        &self,
        practitioner: &Practitioner,
        service_id: Uuid,
        schedule: &WorkSchedule<'_>,
        date: NaiveDate,
        booked: &[BookedRange],
        now: DateTime<Utc>,
    ) -> Result<Vec<Slot>, crate::models::AvailabilityError> {
        let interval = match schedule.interval_for(date.weekday())? {
            Some(interval) => interval,
            None => return Ok(Vec::new()),
        };

        // Anchor the wall-clock bounds to the concrete date.
        let work_start = date.and_time(interval.start_time).and_utc();
        let work_end = date.and_time(interval.end_time).and_utc();

        let mut slots = Vec::new();
        let mut current = work_start;

        // Whole slots only: a trailing remainder shorter than the slot
        // duration is never emitted.
        while current + self.slot_duration <= work_end {
            let slot_end = current + self.slot_duration;

            // Half-open overlap: [current, slot_end) vs [start, end)
            let is_booked = booked
                .iter()
                .any(|range| current < range.end_time && slot_end > range.start_time);

            // Same-day slots that already started are not bookable.
            let in_past = current < now;

            if !is_booked && !in_past {
                slots.push(Slot {
                    practitioner_id: practitioner.id,
                    specialty_id: practitioner.specialty_id,
                    service_id,
                    start_time: current,
                    end_time: slot_end,
                });
            }

            current += self.slot_duration;
        }

        Ok(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone, Weekday};

    use crate::models::WorkInterval;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn practitioner(work_hours: Vec<WorkInterval>) -> Practitioner {
        Practitioner {
            id: Uuid::new_v4(),
            specialty_id: Uuid::new_v4(),
            full_name: "Dr. Test".to_string(),
            work_hours,
        }
    }

    fn generator() -> SlotGenerator {
        SlotGenerator::new(&SchedulingConfig::default())
    }

    // 2025-06-02 is a Monday.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    fn at(date: NaiveDate, h: u32, m: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(&date.and_time(hm(h, m)))
    }

    fn booked(date: NaiveDate, start: (u32, u32), end: (u32, u32)) -> BookedRange {
        BookedRange {
            start_time: at(date, start.0, start.1),
            end_time: at(date, end.0, end.1),
        }
    }

    fn slots_on(
        work_hours: Vec<WorkInterval>,
        date: NaiveDate,
        booked: &[BookedRange],
        now: DateTime<Utc>,
    ) -> Vec<Slot> {
        let p = practitioner(work_hours);
        let schedule = WorkSchedule::new(&p.work_hours);
        generator()
            .slots_for_day(&p, Uuid::new_v4(), &schedule, date, booked, now)
            .unwrap()
    }

    #[test]
    fn two_hour_window_yields_two_slots() {
        // Monday 09:00-11:00, no bookings
        let hours = vec![WorkInterval {
            day: Weekday::Mon,
            start_time: hm(9, 0),
            end_time: hm(11, 0),
        }];
        let now = at(monday(), 0, 0);

        let slots = slots_on(hours, monday(), &[], now);

        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].start_time, at(monday(), 9, 0));
        assert_eq!(slots[0].end_time, at(monday(), 10, 0));
        assert_eq!(slots[1].start_time, at(monday(), 10, 0));
        assert_eq!(slots[1].end_time, at(monday(), 11, 0));
    }

    #[test]
    fn booked_hour_is_excluded() {
        // Same window, 09:00-10:00 already booked
        let hours = vec![WorkInterval {
            day: Weekday::Mon,
            start_time: hm(9, 0),
            end_time: hm(11, 0),
        }];
        let now = at(monday(), 0, 0);
        let existing = vec![booked(monday(), (9, 0), (10, 0))];

        let slots = slots_on(hours, monday(), &existing, now);

        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].start_time, at(monday(), 10, 0));
    }

    #[test]
    fn booking_adjacent_to_slot_does_not_block_it() {
        // Half-open semantics: a booking ending at 10:00 leaves 10:00 free,
        // a booking starting at 11:00 leaves the 10:00-11:00 slot free.
        let hours = vec![WorkInterval {
            day: Weekday::Mon,
            start_time: hm(10, 0),
            end_time: hm(11, 0),
        }];
        let now = at(monday(), 0, 0);
        let existing = vec![
            booked(monday(), (9, 0), (10, 0)),
            booked(monday(), (11, 0), (12, 0)),
        ];

        let slots = slots_on(hours, monday(), &existing, now);

        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].start_time, at(monday(), 10, 0));
    }

    #[test]
    fn partially_overlapping_booking_blocks_the_slot() {
        let hours = vec![WorkInterval {
            day: Weekday::Mon,
            start_time: hm(9, 0),
            end_time: hm(11, 0),
        }];
        let now = at(monday(), 0, 0);
        // 09:30-10:30 clips both candidate slots
        let existing = vec![booked(monday(), (9, 30), (10, 30))];

        let slots = slots_on(hours, monday(), &existing, now);

        assert!(slots.is_empty());
    }

    #[test]
    fn window_of_exactly_one_slot_yields_one_slot() {
        let hours = vec![WorkInterval {
            day: Weekday::Mon,
            start_time: hm(9, 0),
            end_time: hm(10, 0),
        }];
        let now = at(monday(), 0, 0);

        let slots = slots_on(hours, monday(), &[], now);

        assert_eq!(slots.len(), 1);
    }

    #[test]
    fn window_shorter_than_slot_yields_nothing() {
        let hours = vec![WorkInterval {
            day: Weekday::Mon,
            start_time: hm(9, 0),
            end_time: hm(9, 45),
        }];
        let now = at(monday(), 0, 0);

        let slots = slots_on(hours, monday(), &[], now);

        assert!(slots.is_empty());
    }

    #[test]
    fn trailing_remainder_is_dropped() {
        // 09:00-10:30 holds one whole slot; the 30-minute tail is not emitted
        let hours = vec![WorkInterval {
            day: Weekday::Mon,
            start_time: hm(9, 0),
            end_time: hm(10, 30),
        }];
        let now = at(monday(), 0, 0);

        let slots = slots_on(hours, monday(), &[], now);

        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].end_time, at(monday(), 10, 0));
    }

    #[test]
    fn slots_already_started_are_excluded() {
        let hours = vec![WorkInterval {
            day: Weekday::Mon,
            start_time: hm(9, 0),
            end_time: hm(12, 0),
        }];
        // 09:30: the 09:00 slot has started, 10:00 and 11:00 have not
        let now = at(monday(), 9, 30);

        let slots = slots_on(hours, monday(), &[], now);

        assert_eq!(slots.len(), 2);
        assert!(slots.iter().all(|s| s.start_time >= now));
    }

    #[test]
    fn generated_slots_have_fixed_duration_and_no_ledger_overlap() {
        let hours = vec![WorkInterval {
            day: Weekday::Mon,
            start_time: hm(8, 0),
            end_time: hm(18, 0),
        }];
        let now = at(monday(), 0, 0);
        let existing = vec![
            booked(monday(), (9, 0), (10, 0)),
            booked(monday(), (13, 30), (14, 30)),
        ];

        let slots = slots_on(hours, monday(), &existing, now);

        let duration = Duration::minutes(60);
        for slot in &slots {
            assert_eq!(slot.end_time - slot.start_time, duration);
            for range in &existing {
                assert!(!(slot.start_time < range.end_time && slot.end_time > range.start_time));
            }
        }
    }

    #[test]
    fn non_working_day_contributes_nothing() {
        let hours = vec![WorkInterval {
            day: Weekday::Mon,
            start_time: hm(9, 0),
            end_time: hm(11, 0),
        }];
        let tuesday = monday() + Duration::days(1);
        let now = at(monday(), 0, 0);

        let slots = slots_on(hours, tuesday, &[], now);

        assert!(slots.is_empty());
    }

    #[test]
    fn horizon_expansion_skips_malformed_day_and_keeps_valid_days() {
        // Malformed Monday interval alongside a valid Tuesday interval
        let p = practitioner(vec![
            WorkInterval {
                day: Weekday::Mon,
                start_time: hm(10, 0),
                end_time: hm(9, 0),
            },
            WorkInterval {
                day: Weekday::Tue,
                start_time: hm(9, 0),
                end_time: hm(11, 0),
            },
        ]);
        let now = at(monday(), 0, 0);

        let slots = generator().expand_horizon(&p, Uuid::new_v4(), &[], now);

        let tuesday = monday() + Duration::days(1);
        assert_eq!(slots.len(), 2);
        assert!(slots.iter().all(|s| s.start_time.date_naive() == tuesday));
    }

    #[test]
    fn horizon_covers_default_seven_days() {
        let gen = generator();
        let dates = gen.horizon_dates(monday());

        assert_eq!(dates.len(), 7);
        assert_eq!(dates[0], monday());
        assert_eq!(dates[6], monday() + Duration::days(6));
    }
}
