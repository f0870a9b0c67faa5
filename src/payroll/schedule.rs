use chrono::{Datelike as _, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts;
use crate::entity::{holiday, leave, shift, shift_day, sea_orm_active_enums::{LeaveStatus, LeaveType}};

/// Per-weekday schedule resolved from a shift and its day rows.
/// Indexed by `Weekday::num_days_from_monday`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftSchedule {
    days: [Option<(NaiveTime, NaiveTime)>; 7],
    pub grace: Grace,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grace {
    pub delay_minutes: i64,
    pub exit_minutes: i64,
    pub break_minutes: i64,
}

impl ShiftSchedule {
    pub fn from_models(shift: &shift::Model, days: &[shift_day::Model]) -> Self {
        let mut schedule = [None; 7];

        for day in days {
            if !day.is_active {
                continue;
            }

            let (Some(start), Some(end)) = (day.start_time, day.end_time) else {
                continue;
            };

            if (0..7).contains(&day.weekday) {
                schedule[day.weekday as usize] = Some((start, end));
            }
        }

        Self {
            days: schedule,
            grace: Grace {
                delay_minutes: shift.allowed_delay_minutes as i64,
                exit_minutes: shift.allowed_exit_minutes as i64,
                break_minutes: shift.allowed_break_minutes as i64,
            },
        }
    }

    pub fn day_times(&self, date: NaiveDate) -> Option<(NaiveTime, NaiveTime)> {
        self.days[date.weekday().num_days_from_monday() as usize]
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        self.day_times(date).is_some()
    }
}

/// Approved hourly-leave window on a working day. Check events inside it are
/// forgiven and its span reduces the day's required hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl LeaveWindow {
    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_minutes().max(0)
    }

    pub fn covers(&self, time: NaiveTime) -> bool {
        self.start <= time && time <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DayClass {
    /// Paid non-working day; attendance is recorded but never penalized.
    Holiday { name: String },
    /// A daily leave covers the whole day: no required hours, no deductions.
    FullDayLeave,
    Working {
        required_start: NaiveTime,
        required_end: NaiveTime,
        grace: Grace,
        hourly_leaves: Vec<LeaveWindow>,
    },
    /// Weekly rest per the shift schedule (or the default weekend).
    Rest,
    /// No shift assigned and not a default rest day: attendance is recorded
    /// but no lateness/overtime can be computed.
    Unscheduled,
}

/// Org placement used to scope holidays to the employee.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrgScope {
    pub branch_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
}

fn holiday_applies(holiday: &holiday::Model, date: NaiveDate, scope: &OrgScope) -> bool {
    holiday.is_active
        && holiday.date == date
        && holiday.branch_id.is_none_or(|id| scope.branch_id == Some(id))
        && holiday.department_id.is_none_or(|id| scope.department_id == Some(id))
}

fn daily_leave_covers(leave: &leave::Model, date: NaiveDate) -> bool {
    leave.status == LeaveStatus::Active
        && leave.leave_type == LeaveType::Daily
        && leave.start_date <= date
        && date <= leave.end_date.unwrap_or(leave.start_date)
}

fn hourly_leave_window(leave: &leave::Model, date: NaiveDate) -> Option<LeaveWindow> {
    if leave.status != LeaveStatus::Active
        || leave.leave_type != LeaveType::Hourly
        || leave.start_date != date
    {
        return None;
    }

    let (start, end) = (leave.start_time?, leave.end_time?);
    (start < end).then_some(LeaveWindow { start, end })
}

/// Classifies one calendar day for one employee, in priority order:
/// holiday > full-day leave > shift weekday > rest.
pub fn classify(
    date: NaiveDate,
    scope: &OrgScope,
    schedule: Option<&ShiftSchedule>,
    holidays: &[holiday::Model],
    leaves: &[leave::Model],
) -> DayClass {
    if let Some(holiday) = holidays.iter().find(|h| holiday_applies(h, date, scope)) {
        return DayClass::Holiday { name: holiday.name.clone() };
    }

    if leaves.iter().any(|l| daily_leave_covers(l, date)) {
        return DayClass::FullDayLeave;
    }

    let Some(schedule) = schedule else {
        // Legacy convention: employees without a shift rest Friday/Saturday.
        if consts::DEFAULT_REST_DAYS.contains(&date.weekday()) {
            return DayClass::Rest;
        }

        return DayClass::Unscheduled;
    };

    match schedule.day_times(date) {
        Some((required_start, required_end)) => DayClass::Working {
            required_start,
            required_end,
            grace: schedule.grace,
            hourly_leaves: leaves.iter().filter_map(|l| hourly_leave_window(l, date)).collect(),
        },
        None => DayClass::Rest,
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    // 2024-06-03 is a Monday.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    #[test]
    fn test_working_day_from_schedule() {
        let schedule = fixtures::weekday_schedule(10, 10);

        let class = classify(monday(), &OrgScope::default(), Some(&schedule), &[], &[]);

        let DayClass::Working { required_start, required_end, .. } = class else {
            panic!("monday should be working, got {class:?}");
        };
        assert_eq!(required_start, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(required_end, NaiveTime::from_hms_opt(16, 0, 0).unwrap());
    }

    #[test]
    fn test_inactive_weekday_is_rest_regardless_of_attendance() {
        let schedule = fixtures::weekday_schedule(10, 10);
        let friday = NaiveDate::from_ymd_opt(2024, 6, 7).unwrap();

        assert!(!schedule.is_working_day(friday));
        assert_eq!(
            classify(friday, &OrgScope::default(), Some(&schedule), &[], &[]),
            DayClass::Rest
        );
    }

    #[test]
    fn test_holiday_outranks_schedule() {
        let schedule = fixtures::weekday_schedule(10, 10);
        let holidays = [fixtures::holiday(monday(), None)];

        let class = classify(monday(), &OrgScope::default(), Some(&schedule), &holidays, &[]);
        assert!(matches!(class, DayClass::Holiday { .. }));
    }

    #[test]
    fn test_branch_scoped_holiday_only_applies_to_that_branch() {
        let schedule = fixtures::weekday_schedule(10, 10);
        let branch_id = Uuid::new_v4();
        let holidays = [fixtures::holiday(monday(), Some(branch_id))];

        let matching = OrgScope { branch_id: Some(branch_id), department_id: None };
        assert!(matches!(
            classify(monday(), &matching, Some(&schedule), &holidays, &[]),
            DayClass::Holiday { .. }
        ));

        let other = OrgScope { branch_id: Some(Uuid::new_v4()), department_id: None };
        assert!(matches!(
            classify(monday(), &other, Some(&schedule), &holidays, &[]),
            DayClass::Working { .. }
        ));
    }

    #[test]
    fn test_daily_leave_covers_whole_day() {
        let schedule = fixtures::weekday_schedule(10, 10);
        let employee_id = Uuid::new_v4();
        let leaves = [fixtures::daily_leave(employee_id, monday(), monday())];

        let class = classify(monday(), &OrgScope::default(), Some(&schedule), &[], &leaves);
        assert_eq!(class, DayClass::FullDayLeave);
    }

    #[test]
    fn test_hourly_leave_attaches_to_working_day() {
        let schedule = fixtures::weekday_schedule(10, 10);
        let employee_id = Uuid::new_v4();
        let leaves = [fixtures::hourly_leave(employee_id, monday(), (8, 0), (10, 0))];

        let class = classify(monday(), &OrgScope::default(), Some(&schedule), &[], &leaves);

        let DayClass::Working { hourly_leaves, .. } = class else {
            panic!("expected working day");
        };
        assert_eq!(hourly_leaves.len(), 1);
        assert_eq!(hourly_leaves[0].minutes(), 120);
        assert!(hourly_leaves[0].covers(NaiveTime::from_hms_opt(9, 0, 0).unwrap()));
        // The boundary instant itself is forgiven.
        assert!(hourly_leaves[0].covers(NaiveTime::from_hms_opt(10, 0, 0).unwrap()));
        assert!(!hourly_leaves[0].covers(NaiveTime::from_hms_opt(10, 1, 0).unwrap()));
    }

    #[test]
    fn test_no_shift_defaults_to_weekend_rest() {
        let friday = NaiveDate::from_ymd_opt(2024, 6, 7).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2024, 6, 8).unwrap();

        assert_eq!(classify(friday, &OrgScope::default(), None, &[], &[]), DayClass::Rest);
        assert_eq!(classify(saturday, &OrgScope::default(), None, &[], &[]), DayClass::Rest);
        assert_eq!(classify(monday(), &OrgScope::default(), None, &[], &[]), DayClass::Unscheduled);
    }
}
