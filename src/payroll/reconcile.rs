use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entity::attendance;
use crate::utils::minutes_to_hours;

use super::schedule::{DayClass, LeaveWindow};

/// One raw check-in/check-out pair for a day; check-out may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Punch {
    pub check_in: NaiveDateTime,
    pub check_out: Option<NaiveDateTime>,
}

impl From<&attendance::Model> for Punch {
    fn from(row: &attendance::Model) -> Self {
        Self {
            check_in: row.check_in_time,
            check_out: row.check_out_time,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayOutcome {
    Worked,
    /// Working day, no punches, no excuse. Required hours are reported as
    /// zero so the flat absence-transaction deduction is not doubled.
    Absent,
    Rest,
    Holiday,
    FullDayLeave,
    Unscheduled,
}

/// Per-day reconciliation of raw punches against the expected schedule.
/// Durations are stored as whole minutes; the hour accessors convert on
/// demand so downstream money math can stay on exact minute counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub outcome: DayOutcome,
    pub first_in: Option<NaiveDateTime>,
    pub last_out: Option<NaiveDateTime>,
    pub required_minutes: i64,
    /// Head-to-tail span including internal breaks.
    pub total_minutes: i64,
    /// Overlap with the required window plus hourly-leave credit.
    pub inside_shift_minutes: i64,
    pub late_minutes: i64,
    pub early_leave_minutes: i64,
    pub overtime_minutes: i64,
    /// Some punch on this day has no check-out.
    pub incomplete: bool,
}

impl DailyRecord {
    fn empty(date: NaiveDate, outcome: DayOutcome) -> Self {
        Self {
            date,
            outcome,
            first_in: None,
            last_out: None,
            required_minutes: 0,
            total_minutes: 0,
            inside_shift_minutes: 0,
            late_minutes: 0,
            early_leave_minutes: 0,
            overtime_minutes: 0,
            incomplete: false,
        }
    }

    pub fn required_hours(&self) -> Decimal {
        minutes_to_hours(self.required_minutes)
    }

    pub fn total_hours(&self) -> Decimal {
        minutes_to_hours(self.total_minutes)
    }

    pub fn late_hours(&self) -> Decimal {
        minutes_to_hours(self.late_minutes)
    }

    pub fn early_leave_hours(&self) -> Decimal {
        minutes_to_hours(self.early_leave_minutes)
    }

    pub fn overtime_hours(&self) -> Decimal {
        minutes_to_hours(self.overtime_minutes)
    }
}

fn covered_by_leave(leaves: &[LeaveWindow], time: chrono::NaiveTime) -> bool {
    leaves.iter().any(|window| window.covers(time))
}

fn span(punches: &[Punch]) -> (NaiveDateTime, Option<NaiveDateTime>, bool) {
    let first_in = punches.iter().map(|p| p.check_in).min().unwrap();
    let last_out = punches.iter().filter_map(|p| p.check_out).max();
    let incomplete = punches.iter().any(|p| p.check_out.is_none());

    (first_in, last_out, incomplete)
}

/// Merges the day classification with the day's punches into a [`DailyRecord`].
///
/// On holidays, full-day leaves and rest days any punches are still recorded
/// but lateness/early-leave/overtime are forced to zero.
pub fn reconcile(date: NaiveDate, class: &DayClass, punches: &[Punch]) -> DailyRecord {
    let passive_outcome = match class {
        DayClass::Holiday { .. } => Some(DayOutcome::Holiday),
        DayClass::FullDayLeave => Some(DayOutcome::FullDayLeave),
        DayClass::Rest => Some(DayOutcome::Rest),
        DayClass::Unscheduled => Some(DayOutcome::Unscheduled),
        DayClass::Working { .. } => None,
    };

    if let Some(outcome) = passive_outcome {
        let mut record = DailyRecord::empty(date, outcome);

        if !punches.is_empty() {
            let (first_in, last_out, incomplete) = span(punches);
            record.first_in = Some(first_in);
            record.last_out = last_out;
            record.incomplete = incomplete;
            record.total_minutes = last_out
                .map(|out| (out - first_in).num_minutes().max(0))
                .unwrap_or(0);
        }

        return record;
    }

    let DayClass::Working { required_start, required_end, grace, hourly_leaves } = class else {
        unreachable!();
    };

    if punches.is_empty() {
        return DailyRecord::empty(date, DayOutcome::Absent);
    }

    let (first_in, last_out, incomplete) = span(punches);

    let leave_minutes: i64 = hourly_leaves.iter().map(LeaveWindow::minutes).sum();
    let scheduled_minutes = (*required_end - *required_start).num_minutes().max(0);
    let required_minutes = (scheduled_minutes - leave_minutes).max(0);

    let total_minutes = last_out
        .map(|out| (out - first_in).num_minutes().max(0))
        .unwrap_or(0);

    // Overlap of [first_in, last_out] with the required window, with the
    // approved leave time credited back as worked.
    let inside_shift_minutes = last_out
        .map(|out| {
            let window_start = first_in.time().max(*required_start);
            let window_end = out.time().min(*required_end);
            (window_end - window_start).num_minutes().max(0)
        })
        .unwrap_or(0)
        + leave_minutes;

    let in_time = first_in.time();
    let late_minutes = if (in_time - *required_start).num_minutes() > grace.delay_minutes
        && !covered_by_leave(hourly_leaves, in_time)
    {
        // Full delta from the required start, not just the excess over grace.
        (in_time - *required_start).num_minutes()
    } else {
        0
    };

    let early_leave_minutes = last_out
        .map(|out| {
            let out_time = out.time();
            if (*required_end - out_time).num_minutes() > grace.exit_minutes
                && !covered_by_leave(hourly_leaves, out_time)
            {
                (*required_end - out_time).num_minutes()
            } else {
                0
            }
        })
        .unwrap_or(0);

    let overtime_minutes = (total_minutes - required_minutes).max(0);

    DailyRecord {
        date,
        outcome: DayOutcome::Worked,
        first_in: Some(first_in),
        last_out,
        required_minutes,
        total_minutes,
        inside_shift_minutes,
        late_minutes,
        early_leave_minutes,
        overtime_minutes,
        incomplete,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::payroll::schedule::{self, fixtures, OrgScope};

    use super::*;

    // 2024-06-03 is a Monday; the fixture schedule works 08:00–16:00.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        monday().and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap())
    }

    fn punch(check_in: NaiveDateTime, check_out: NaiveDateTime) -> Punch {
        Punch { check_in, check_out: Some(check_out) }
    }

    fn working_class(delay: i32, exit: i32, leaves: &[crate::entity::leave::Model]) -> DayClass {
        let sched = fixtures::weekday_schedule(delay, exit);
        schedule::classify(monday(), &OrgScope::default(), Some(&sched), &[], leaves)
    }

    #[test]
    fn test_on_time_full_day() {
        let class = working_class(10, 10, &[]);
        let record = reconcile(monday(), &class, &[punch(at(8, 0), at(16, 0))]);

        assert_eq!(record.outcome, DayOutcome::Worked);
        assert_eq!(record.required_minutes, 480);
        assert_eq!(record.total_minutes, 480);
        assert_eq!(record.inside_shift_minutes, 480);
        assert_eq!(record.late_minutes, 0);
        assert_eq!(record.early_leave_minutes, 0);
        assert_eq!(record.overtime_minutes, 0);
        assert!(!record.incomplete);
        assert_eq!(record.total_hours(), dec!(8));
    }

    #[test]
    fn test_late_past_grace_charges_full_delta() {
        // 25 minutes late against a 10-minute grace window: the whole 25
        // minutes is charged, not just the 15 past the grace.
        let class = working_class(10, 10, &[]);
        let record = reconcile(monday(), &class, &[punch(at(8, 25), at(16, 0))]);

        assert_eq!(record.late_minutes, 25);
        assert_eq!(record.late_hours().round_dp(4), dec!(0.4167));
    }

    #[test]
    fn test_late_within_grace_is_free() {
        let class = working_class(10, 10, &[]);
        let record = reconcile(monday(), &class, &[punch(at(8, 9), at(16, 0))]);

        assert_eq!(record.late_minutes, 0);
    }

    #[test]
    fn test_early_leave_symmetric_to_lateness() {
        let class = working_class(10, 10, &[]);
        let record = reconcile(monday(), &class, &[punch(at(8, 0), at(15, 20))]);

        // Left 40 minutes early, grace 10: full 40 minutes charged.
        assert_eq!(record.early_leave_minutes, 40);
    }

    #[test]
    fn test_hourly_leave_forgives_late_check_in() {
        let employee_id = Uuid::new_v4();
        let leaves = [fixtures::hourly_leave(employee_id, monday(), (8, 0), (10, 0))];
        let class = working_class(10, 10, &leaves);

        // Checks in at 09:30, inside the approved 08:00–10:00 leave window.
        let record = reconcile(monday(), &class, &[punch(at(9, 30), at(16, 0))]);

        assert_eq!(record.late_minutes, 0);
        assert_eq!(record.early_leave_minutes, 0);
        // Required time is reduced by the two leave hours.
        assert_eq!(record.required_minutes, 360);
        // Leave time counts as worked inside the shift.
        assert_eq!(record.inside_shift_minutes, 390 + 120);
    }

    #[test]
    fn test_overtime_after_leave_reduction() {
        let employee_id = Uuid::new_v4();
        let leaves = [fixtures::hourly_leave(employee_id, monday(), (8, 0), (10, 0))];
        let class = working_class(10, 10, &leaves);

        // Works 10:00–17:00 = 7 actual hours against 6 required.
        let record = reconcile(monday(), &class, &[punch(at(10, 0), at(17, 0))]);

        assert_eq!(record.overtime_minutes, 60);
    }

    #[test]
    fn test_multiple_punches_use_head_to_tail_span() {
        let class = working_class(10, 10, &[]);
        let punches = [
            punch(at(13, 0), at(16, 0)),
            punch(at(8, 0), at(12, 0)),
        ];

        let record = reconcile(monday(), &class, &punches);

        assert_eq!(record.first_in, Some(at(8, 0)));
        assert_eq!(record.last_out, Some(at(16, 0)));
        // Span includes the internal break.
        assert_eq!(record.total_minutes, 480);
    }

    #[test]
    fn test_missing_check_out_flags_incomplete() {
        let class = working_class(10, 10, &[]);
        let punches = [Punch { check_in: at(8, 0), check_out: None }];

        let record = reconcile(monday(), &class, &punches);

        assert!(record.incomplete);
        assert_eq!(record.last_out, None);
        assert_eq!(record.total_minutes, 0);
    }

    #[test]
    fn test_absent_working_day_reports_zero_required_minutes() {
        let class = working_class(10, 10, &[]);
        let record = reconcile(monday(), &class, &[]);

        assert_eq!(record.outcome, DayOutcome::Absent);
        assert_eq!(record.required_minutes, 0);
        assert_eq!(record.late_minutes, 0);
    }

    #[test]
    fn test_holiday_zeroes_penalties_despite_punches() {
        let holidays = [fixtures::holiday(monday(), None)];
        let sched = fixtures::weekday_schedule(10, 10);
        let class = schedule::classify(monday(), &OrgScope::default(), Some(&sched), &holidays, &[]);

        let record = reconcile(monday(), &class, &[punch(at(11, 0), at(13, 0))]);

        assert_eq!(record.outcome, DayOutcome::Holiday);
        assert_eq!(record.total_minutes, 120);
        assert_eq!(record.late_minutes, 0);
        assert_eq!(record.overtime_minutes, 0);
        assert_eq!(record.required_minutes, 0);
    }
}
