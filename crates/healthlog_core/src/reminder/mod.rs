//! Medication reminder evaluation.
//!
//! # Responsibility
//! - Decide which scheduled doses are due at a given local instant.
//!
//! # Invariants
//! - Pure function of its inputs; reads no clock and no store.
//! - A dose is due when `|now - scheduled| <= tolerance`, where scheduled is
//!   the medication time on today's or yesterday's date (midnight wrap).
//! - The wrap only looks backward: tomorrow's dose is never a candidate, so
//!   a 00:05 dose is not due at 23:55 the evening before even when it is
//!   within tolerance. It becomes due once the clock passes midnight.
//! - A medication taken today is never due. A candidate dose is skipped when
//!   its own day was marked taken.
//! - `as_needed` medications are never due.
//! - Results are ordered by scheduled instant, then name, then id.

use crate::model::medication::Medication;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Tolerance applied when configuration does not override it.
pub const DEFAULT_TOLERANCE_MINUTES: u32 = 15;

/// One due dose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DueReminder {
    pub medication: Medication,
    /// The scheduled instant that matched `now`.
    pub scheduled_at: NaiveDateTime,
    /// `now - scheduled_at` in whole minutes; negative while upcoming.
    pub offset_minutes: i64,
}

/// Returns the doses due at `now` within `tolerance_minutes`.
pub fn due_reminders(
    medications: &[Medication],
    now: NaiveDateTime,
    tolerance_minutes: u32,
) -> Vec<DueReminder> {
    let tolerance_seconds = i64::from(tolerance_minutes) * 60;
    let mut due = medications
        .iter()
        .filter_map(|medication| nearest_due_dose(medication, now, tolerance_seconds))
        .collect::<Vec<_>>();

    due.sort_by(|left, right| {
        left.scheduled_at
            .cmp(&right.scheduled_at)
            .then_with(|| left.medication.name.cmp(&right.medication.name))
            .then_with(|| left.medication.id.cmp(&right.medication.id))
    });
    due
}

fn nearest_due_dose(
    medication: &Medication,
    now: NaiveDateTime,
    tolerance_seconds: i64,
) -> Option<DueReminder> {
    let today = now.date();
    if medication.is_taken_on(today) {
        return None;
    }

    candidate_days(today)
        .filter(|day| medication.is_scheduled_on(*day) && !medication.is_taken_on(*day))
        .map(|day| {
            let scheduled_at = day.and_time(medication.time_of_day);
            let offset_seconds = now.signed_duration_since(scheduled_at).num_seconds();
            (scheduled_at, offset_seconds)
        })
        .filter(|(_, offset_seconds)| offset_seconds.abs() <= tolerance_seconds)
        .min_by_key(|(_, offset_seconds)| offset_seconds.abs())
        .map(|(scheduled_at, offset_seconds)| DueReminder {
            medication: medication.clone(),
            scheduled_at,
            offset_minutes: offset_seconds / 60,
        })
}

/// Today and yesterday only; see the module invariants.
fn candidate_days(today: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    [Some(today), today.pred_opt()].into_iter().flatten()
}

#[cfg(test)]
mod tests {
    use super::{due_reminders, DEFAULT_TOLERANCE_MINUTES};
    use crate::model::medication::{Frequency, Medication};
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
    use uuid::Uuid;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(date: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
        date.and_hms_opt(h, m, 0).unwrap()
    }

    fn medication(name: &str, h: u32, m: u32) -> Medication {
        Medication {
            id: Uuid::new_v4(),
            person: "Self".to_string(),
            name: name.to_string(),
            dosage: "1 tablet".to_string(),
            time_of_day: NaiveTime::from_hms_opt(h, m, 0).unwrap(),
            frequency: Frequency::Daily,
            start_date: day(2024, 1, 1),
            caregiver_email: None,
            taken_on: None,
            created_at: 0,
        }
    }

    #[test]
    fn dose_within_tolerance_is_due_and_outside_is_not() {
        let meds = vec![medication("Metformin", 8, 0)];
        let today = day(2024, 3, 4);

        let due = due_reminders(&meds, at(today, 8, 10), DEFAULT_TOLERANCE_MINUTES);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].offset_minutes, 10);

        assert!(due_reminders(&meds, at(today, 8, 20), DEFAULT_TOLERANCE_MINUTES).is_empty());
    }

    #[test]
    fn tolerance_boundary_is_inclusive_on_both_sides() {
        let meds = vec![medication("Metformin", 8, 0)];
        let today = day(2024, 3, 4);
        assert_eq!(due_reminders(&meds, at(today, 8, 15), 15).len(), 1);
        let early = due_reminders(&meds, at(today, 7, 45), 15);
        assert_eq!(early.len(), 1);
        assert_eq!(early[0].offset_minutes, -15);
    }

    #[test]
    fn dose_before_midnight_is_due_just_after_midnight() {
        let meds = vec![medication("Melatonin", 23, 55)];
        let due = due_reminders(&meds, at(day(2024, 3, 5), 0, 5), 15);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].scheduled_at, at(day(2024, 3, 4), 23, 55));
        assert_eq!(due[0].offset_minutes, 10);
    }

    #[test]
    fn dose_just_after_midnight_is_not_due_the_evening_before() {
        let meds = vec![medication("Levothyroxine", 0, 5)];
        assert!(due_reminders(&meds, at(day(2024, 3, 4), 23, 55), 15).is_empty());

        let due = due_reminders(&meds, at(day(2024, 3, 5), 0, 0), 15);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].offset_minutes, -5);
    }

    #[test]
    fn yesterday_dose_marked_taken_yesterday_is_not_due_after_midnight() {
        let mut late = medication("Melatonin", 23, 55);
        late.taken_on = Some(day(2024, 3, 4));
        assert!(due_reminders(&[late], at(day(2024, 3, 5), 0, 5), 15).is_empty());
    }

    #[test]
    fn taken_today_is_excluded_regardless_of_time() {
        let mut med = medication("Metformin", 8, 0);
        med.taken_on = Some(day(2024, 3, 4));
        assert!(due_reminders(&[med], at(day(2024, 3, 4), 8, 0), 15).is_empty());
    }

    #[test]
    fn taken_flag_from_previous_day_does_not_suppress_today() {
        let mut med = medication("Metformin", 8, 0);
        med.taken_on = Some(day(2024, 3, 3));
        assert_eq!(due_reminders(&[med], at(day(2024, 3, 4), 8, 5), 15).len(), 1);
    }

    #[test]
    fn as_needed_is_never_due() {
        let mut med = medication("Ibuprofen", 8, 0);
        med.frequency = Frequency::AsNeeded;
        assert!(due_reminders(&[med], at(day(2024, 3, 4), 8, 0), 15).is_empty());
    }

    #[test]
    fn weekly_dose_is_due_only_on_its_weekday() {
        let mut med = medication("Methotrexate", 9, 0);
        med.frequency = Frequency::Weekly;
        med.start_date = day(2024, 3, 4);
        let meds = vec![med];
        assert_eq!(due_reminders(&meds, at(day(2024, 3, 11), 9, 0), 15).len(), 1);
        assert!(due_reminders(&meds, at(day(2024, 3, 12), 9, 0), 15).is_empty());
    }

    #[test]
    fn schedule_does_not_fire_before_start_date() {
        let mut med = medication("Metformin", 8, 0);
        med.start_date = day(2024, 3, 10);
        assert!(due_reminders(&[med], at(day(2024, 3, 4), 8, 0), 15).is_empty());
    }

    #[test]
    fn results_are_ordered_by_scheduled_instant() {
        let meds = vec![
            medication("Zinc", 0, 3),
            medication("Aspirin", 0, 3),
            medication("Melatonin", 23, 55),
        ];
        let due = due_reminders(&meds, at(day(2024, 3, 5), 0, 1), 15);
        let names = due
            .iter()
            .map(|item| item.medication.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Melatonin", "Aspirin", "Zinc"]);
    }
}
