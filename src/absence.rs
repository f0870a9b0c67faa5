//! Absence-transaction sweep. Scans the trailing window for working days an
//! employee never punched on and proposes one absence transaction per such
//! day. The (employee, absence_date) unique constraint makes re-running the
//! sweep a no-op for days already transacted.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::consts::ABSENCE_SWEEP_DAYS;
use crate::entity::{absence_answer, absence_question, holiday, leave};
use crate::payroll::schedule::{classify, DayClass, OrgScope, ShiftSchedule};
use crate::utils::days_between;

/// A (employee-relative) day the sweep wants an absence transaction for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbsenceCandidate {
    pub date: NaiveDate,
}

/// Working days in the last [`ABSENCE_SWEEP_DAYS`] days (up to and including
/// yesterday) with no attendance row and no existing absence transaction.
/// Holidays, leaves, rest days, and unscheduled days never qualify.
pub fn absence_candidates(
    today: NaiveDate,
    scope: &OrgScope,
    schedule: Option<&ShiftSchedule>,
    holidays: &[holiday::Model],
    leaves: &[leave::Model],
    attended: &BTreeSet<NaiveDate>,
    transacted: &BTreeSet<NaiveDate>,
) -> Vec<AbsenceCandidate> {
    let start = today - chrono::Duration::days(ABSENCE_SWEEP_DAYS);
    let yesterday = today - chrono::Duration::days(1);

    if yesterday < start {
        return Vec::new();
    }

    days_between(start, yesterday)
        .filter(|date| !attended.contains(date) && !transacted.contains(date))
        .filter(|date| {
            matches!(
                classify(*date, scope, schedule, holidays, leaves),
                DayClass::Working { .. }
            )
        })
        .map(|date| AbsenceCandidate { date })
        .collect()
}

/// Transaction numbers are unique per day: `ABS-YYYYMMDD-NNNN`, where the
/// sequence is one past the count of numbers already issued that day.
pub fn transaction_number(date: NaiveDate, issued_today: u64) -> String {
    format!("ABS-{}-{:04}", date.format("%Y%m%d"), issued_today + 1)
}

/// Deduction levied by an approved absence: the sum of `deduction_value`
/// (fractional day units) over every answered question, times the daily rate.
pub fn answered_deduction(
    answers: &[absence_answer::Model],
    questions: &[absence_question::Model],
    daily_rate: Decimal,
) -> Decimal {
    let day_units: Decimal = answers
        .iter()
        .filter(|answer| answer.is_answered)
        .filter_map(|answer| {
            questions
                .iter()
                .find(|question| question.id == answer.absence_question_id)
        })
        .map(|question| question.deduction_value)
        .sum();

    day_units * daily_rate
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use super::*;
    use crate::payroll::schedule::fixtures;

    fn sweep(
        today: NaiveDate,
        attended: &BTreeSet<NaiveDate>,
        transacted: &BTreeSet<NaiveDate>,
    ) -> Vec<AbsenceCandidate> {
        let schedule = fixtures::weekday_schedule(10, 10);
        absence_candidates(
            today,
            &OrgScope::default(),
            Some(&schedule),
            &[],
            &[],
            attended,
            transacted,
        )
    }

    #[test]
    fn test_flags_unattended_working_days_only() {
        // Monday; the schedule works Mon-Thu 08:00-16:00.
        let today = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let mut attended = BTreeSet::new();
        // Attended everything except Thu 2024-05-30.
        for candidate in sweep(today, &BTreeSet::new(), &BTreeSet::new()) {
            if candidate.date != NaiveDate::from_ymd_opt(2024, 5, 30).unwrap() {
                attended.insert(candidate.date);
            }
        }

        let candidates = sweep(today, &attended, &BTreeSet::new());

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].date, NaiveDate::from_ymd_opt(2024, 5, 30).unwrap());
    }

    #[test]
    fn test_rest_days_and_holidays_never_qualify() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();

        let candidates = sweep(today, &BTreeSet::new(), &BTreeSet::new());

        for candidate in &candidates {
            let weekday = chrono::Datelike::weekday(&candidate.date);
            assert!(
                !matches!(weekday, chrono::Weekday::Fri | chrono::Weekday::Sat),
                "{} is a rest day",
                candidate.date
            );
        }
    }

    #[test]
    fn test_existing_transactions_are_excluded() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();

        let first = sweep(today, &BTreeSet::new(), &BTreeSet::new());
        assert!(!first.is_empty());

        // Re-run with everything already transacted: nothing new.
        let transacted: BTreeSet<_> = first.iter().map(|c| c.date).collect();
        let second = sweep(today, &BTreeSet::new(), &transacted);

        assert!(second.is_empty());
    }

    #[test]
    fn test_transaction_number_sequences_per_day() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();

        assert_eq!(transaction_number(date, 0), "ABS-20240603-0001");
        assert_eq!(transaction_number(date, 41), "ABS-20240603-0042");
    }

    fn question(deduction_value: Decimal) -> absence_question::Model {
        absence_question::Model {
            id: Uuid::new_v4(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
            question: "was the absence notified in advance?".to_string(),
            deduction_value,
            is_active: true,
        }
    }

    fn answer(question_id: Uuid, is_answered: bool) -> absence_answer::Model {
        absence_answer::Model {
            id: Uuid::new_v4(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
            absence_transaction_id: Uuid::new_v4(),
            absence_question_id: question_id,
            is_answered,
        }
    }

    #[test]
    fn test_only_answered_questions_deduct() {
        let half_day = question(dec!(0.5));
        let full_day = question(dec!(1));
        let questions = vec![half_day.clone(), full_day.clone()];

        let answers = vec![answer(half_day.id, true), answer(full_day.id, false)];

        assert_eq!(answered_deduction(&answers, &questions, dec!(100)), dec!(50));
    }
}
