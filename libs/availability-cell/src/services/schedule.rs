// libs/availability-cell/src/services/schedule.rs
use chrono::Weekday;

use crate::models::{AvailabilityError, WorkInterval};

/// Read-only view over a practitioner's recurring weekly working hours.
///
/// The administrative collaborator rejects malformed intervals at data-entry
/// time, but stored records are re-validated here before any slot is
/// generated: a defective record must not silently produce negative-duration
/// slots.
pub struct WorkSchedule<'a> {
    intervals: &'a [WorkInterval],
}

impl<'a> WorkSchedule<'a> {
    pub fn new(intervals: &'a [WorkInterval]) -> Self {
        Self { intervals }
    }

    /// Zero or one wall-clock `[start, end)` interval for the given weekday.
    ///
    /// Fails for that weekday if the stored interval has `start >= end`, or
    /// if more than one interval claims the same day. Other weekdays are
    /// unaffected.
    pub fn interval_for(&self, day: Weekday) -> Result<Option<&'a WorkInterval>, AvailabilityError> {
        let mut found: Option<&WorkInterval> = None;

        for interval in self.intervals.iter().filter(|i| i.day == day) {
            if interval.start_time >= interval.end_time {
                return Err(AvailabilityError::InvalidSchedule {
                    day,
                    start_time: interval.start_time,
                    end_time: interval.end_time,
                });
            }

            if found.is_some() {
                return Err(AvailabilityError::ConflictingIntervals { day });
            }

            found = Some(interval);
        }

        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::NaiveTime;

    fn interval(day: Weekday, start: (u32, u32), end: (u32, u32)) -> WorkInterval {
        WorkInterval {
            day,
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        }
    }

    #[test]
    fn returns_interval_for_working_day() {
        let intervals = vec![interval(Weekday::Mon, (9, 0), (17, 0))];
        let schedule = WorkSchedule::new(&intervals);

        let monday = schedule.interval_for(Weekday::Mon).unwrap();
        assert_eq!(monday, Some(&intervals[0]));
    }

    #[test]
    fn returns_none_for_day_off() {
        let intervals = vec![interval(Weekday::Mon, (9, 0), (17, 0))];
        let schedule = WorkSchedule::new(&intervals);

        assert_eq!(schedule.interval_for(Weekday::Sun).unwrap(), None);
    }

    #[test]
    fn rejects_interval_with_start_after_end() {
        let intervals = vec![interval(Weekday::Mon, (10, 0), (9, 0))];
        let schedule = WorkSchedule::new(&intervals);

        assert_matches!(
            schedule.interval_for(Weekday::Mon),
            Err(AvailabilityError::InvalidSchedule { day: Weekday::Mon, .. })
        );
    }

    #[test]
    fn rejects_zero_length_interval() {
        let intervals = vec![interval(Weekday::Tue, (9, 0), (9, 0))];
        let schedule = WorkSchedule::new(&intervals);

        assert_matches!(
            schedule.interval_for(Weekday::Tue),
            Err(AvailabilityError::InvalidSchedule { .. })
        );
    }

    #[test]
    fn rejects_duplicate_intervals_for_same_day() {
        let intervals = vec![
            interval(Weekday::Wed, (9, 0), (12, 0)),
            interval(Weekday::Wed, (11, 0), (15, 0)),
        ];
        let schedule = WorkSchedule::new(&intervals);

        assert_matches!(
            schedule.interval_for(Weekday::Wed),
            Err(AvailabilityError::ConflictingIntervals { day: Weekday::Wed })
        );
    }

    #[test]
    fn malformed_day_does_not_affect_other_days() {
        let intervals = vec![
            interval(Weekday::Mon, (10, 0), (9, 0)),
            interval(Weekday::Tue, (9, 0), (11, 0)),
        ];
        let schedule = WorkSchedule::new(&intervals);

        assert!(schedule.interval_for(Weekday::Mon).is_err());
        assert_eq!(schedule.interval_for(Weekday::Tue).unwrap(), Some(&intervals[1]));
    }
}
