//! Medication adherence for one day.

use crate::model::medication::Medication;
use chrono::NaiveDate;
use serde::Serialize;

/// Taken vs scheduled doses for `day`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Adherence {
    pub day: NaiveDate,
    pub taken: usize,
    pub scheduled: usize,
    /// `0.0` when nothing is scheduled.
    pub percent: f64,
}

/// Counts doses scheduled on `day` and how many were marked taken.
///
/// `as_needed` medications and schedules starting after `day` are ignored.
pub fn medication_adherence(medications: &[Medication], day: NaiveDate) -> Adherence {
    let scheduled = medications
        .iter()
        .filter(|medication| medication.is_scheduled_on(day))
        .collect::<Vec<_>>();
    let taken = scheduled
        .iter()
        .filter(|medication| medication.is_taken_on(day))
        .count();
    let percent = if scheduled.is_empty() {
        0.0
    } else {
        taken as f64 * 100.0 / scheduled.len() as f64
    };

    Adherence {
        day,
        taken,
        scheduled: scheduled.len(),
        percent,
    }
}

#[cfg(test)]
mod tests {
    use super::medication_adherence;
    use crate::model::medication::{Frequency, Medication};
    use chrono::{NaiveDate, NaiveTime};
    use uuid::Uuid;

    fn medication(frequency: Frequency, taken_on: Option<NaiveDate>) -> Medication {
        Medication {
            id: Uuid::new_v4(),
            person: "Self".to_string(),
            name: "Lisinopril".to_string(),
            dosage: "10 mg".to_string(),
            time_of_day: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            frequency,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            caregiver_email: None,
            taken_on,
            created_at: 0,
        }
    }

    #[test]
    fn adherence_counts_only_scheduled_doses() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let meds = vec![
            medication(Frequency::Daily, Some(day)),
            medication(Frequency::Daily, None),
            medication(Frequency::AsNeeded, Some(day)),
        ];
        let adherence = medication_adherence(&meds, day);
        assert_eq!(adherence.scheduled, 2);
        assert_eq!(adherence.taken, 1);
        assert_eq!(adherence.percent, 50.0);
    }

    #[test]
    fn empty_schedule_is_zero_not_nan() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let adherence = medication_adherence(&[], day);
        assert_eq!(adherence.scheduled, 0);
        assert_eq!(adherence.percent, 0.0);
    }
}
