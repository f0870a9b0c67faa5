use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::consts;
use crate::entity::sea_orm_active_enums::{LeaveStatus, LeaveType, MonthlyDayStatus};
use crate::utils::minutes_to_hours;

use super::aggregate::PayrollContext;
use super::reconcile::DayOutcome;

/// Machine-readable per-system breakdown attached to the salary figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "system", rename_all = "snake_case")]
pub enum SystemDetails {
    Monthly {
        daily_rate: Decimal,
        full_days: u32,
        half_days: u32,
        online_days: u32,
        excused_absences: u32,
        unexcused_absences: u32,
        missing_days: u32,
    },
    Shift {
        overtime_minutes: i64,
        overtime_value: Decimal,
        delay_minutes: i64,
        delay_value: Decimal,
        leave_credit: Decimal,
        worked_days: u32,
        absent_days: u32,
    },
    Production {
        total_quantity: Decimal,
        unpriced_rows: u32,
        production_value: Decimal,
    },
    Hourly {
        hours_worked: Decimal,
        hourly_total: Decimal,
        days_present: u32,
        daily_total: Decimal,
    },
    None,
}

/// Monthly system: walks the coarse MonthlyAttendance statuses.
/// A period day with no row at all is a deliberate strict default: it costs
/// the same as an unexcused absence.
pub fn monthly(ctx: &PayrollContext) -> (Decimal, Decimal, SystemDetails) {
    let daily_rate = ctx.employee.monthly_salary / Decimal::from(consts::MONTHLY_DAY_DIVISOR);
    let half_rate = daily_rate / Decimal::from(2);
    let unexcused_rate = daily_rate * Decimal::from(consts::UNEXCUSED_ABSENCE_MULTIPLIER);

    let mut additions = Decimal::ZERO;
    let mut deductions = Decimal::ZERO;
    let (mut full, mut half, mut online, mut excused, mut unexcused, mut missing) = (0u32, 0, 0, 0, 0, 0);

    for date in ctx.period.days() {
        let status = ctx
            .monthly_days
            .iter()
            .find(|row| row.employee_id == ctx.employee.id && row.date == date)
            .map(|row| row.day_status);

        match status {
            Some(MonthlyDayStatus::FullDay) => {
                full += 1;
                additions += daily_rate;
            }
            Some(MonthlyDayStatus::HalfDay) => {
                half += 1;
                additions += half_rate;
            }
            Some(MonthlyDayStatus::OnlineDay) => {
                online += 1;
                additions += half_rate;
            }
            Some(MonthlyDayStatus::ExcusedAbsence) => {
                excused += 1;
                deductions += daily_rate;
            }
            Some(MonthlyDayStatus::UnexcusedAbsence) => {
                unexcused += 1;
                deductions += unexcused_rate;
            }
            None => {
                missing += 1;
                deductions += unexcused_rate;
            }
        }
    }

    let details = SystemDetails::Monthly {
        daily_rate,
        full_days: full,
        half_days: half,
        online_days: online,
        excused_absences: excused,
        unexcused_absences: unexcused,
        missing_days: missing,
    };

    (additions, deductions, details)
}

/// Shift system: runs the classifier/reconciler over every period day,
/// pricing overtime per hour and lateness/early-leave per minute, and
/// crediting approved leave separately. An absence with no filed absence
/// transaction deducts nothing here; that transaction carries its own levy.
pub fn shift(ctx: &PayrollContext) -> (Decimal, Decimal, SystemDetails) {
    let (overtime_hour_value, delay_minute_value) = ctx
        .job_title
        .map(|title| (title.overtime_hour_value, title.delay_minute_value))
        .unwrap_or((Decimal::ZERO, Decimal::ZERO));

    let mut overtime_minutes = 0i64;
    let mut delay_minutes = 0i64;
    let (mut worked_days, mut absent_days) = (0u32, 0u32);

    for record in ctx.daily_records() {
        match record.outcome {
            DayOutcome::Worked => {
                worked_days += 1;
                overtime_minutes += record.overtime_minutes;
                delay_minutes += record.late_minutes + record.early_leave_minutes;
            }
            DayOutcome::Absent => absent_days += 1,
            _ => {}
        }
    }

    let overtime_value = minutes_to_hours(overtime_minutes) * overtime_hour_value;
    let delay_value = Decimal::from(delay_minutes) * delay_minute_value;

    // Daily leave is credited at the full daily rate, hourly leave at
    // daily_rate / 8 per hour.
    let hour_rate = ctx.employee.daily_rate / Decimal::from(consts::LEAVE_DAY_HOURS);
    let mut leave_credit = Decimal::ZERO;

    for leave in ctx.leaves {
        if leave.status != LeaveStatus::Active {
            continue;
        }

        match leave.leave_type {
            LeaveType::Daily => {
                let end = leave.end_date.unwrap_or(leave.start_date);
                let covered = crate::utils::days_between(leave.start_date, end)
                    .filter(|day| ctx.period.contains(*day))
                    .count();
                leave_credit += ctx.employee.daily_rate * Decimal::from(covered as u32);
            }
            LeaveType::Hourly => {
                if !ctx.period.contains(leave.start_date) {
                    continue;
                }

                let hours = leave.hours.unwrap_or_else(|| {
                    match (leave.start_time, leave.end_time) {
                        (Some(start), Some(end)) => minutes_to_hours((end - start).num_minutes().max(0)),
                        _ => Decimal::ZERO,
                    }
                });
                leave_credit += hour_rate * hours;
            }
        }
    }

    let details = SystemDetails::Shift {
        overtime_minutes,
        overtime_value,
        delay_minutes,
        delay_value,
        leave_credit,
        worked_days,
        absent_days,
    };

    (overtime_value + leave_credit, delay_value, details)
}

/// Production system: pure addition; every monitored row prices its piece
/// at the matching quality grade. Rows with no price level for their grade
/// contribute nothing and are surfaced in the details.
pub fn production(ctx: &PayrollContext) -> (Decimal, Decimal, SystemDetails) {
    let mut production_value = Decimal::ZERO;
    let mut total_quantity = Decimal::ZERO;
    let mut unpriced_rows = 0u32;

    for row in ctx.production {
        if !ctx.period.contains(row.date) {
            continue;
        }

        total_quantity += row.quantity;

        let price = ctx
            .piece_prices
            .iter()
            .find(|p| p.piece_id == row.piece_id && p.grade == row.grade)
            .map(|p| p.price);

        match price {
            Some(price) => production_value += price * row.quantity,
            None => {
                unpriced_rows += 1;
                tracing::warn!(
                    "no price level for piece {} grade {:?}, row skipped",
                    row.piece_id,
                    row.grade
                );
            }
        }
    }

    let details = SystemDetails::Production {
        total_quantity,
        unpriced_rows,
        production_value,
    };

    (production_value, Decimal::ZERO, details)
}

/// Hourly/profession system: the employee is paid the larger of
/// hours-worked × hourly_rate and distinct-days-present × daily_rate.
pub fn hourly(ctx: &PayrollContext) -> (Decimal, Decimal, SystemDetails) {
    let (hourly_rate, daily_rate) = ctx
        .profession
        .map(|p| (p.hourly_rate, p.daily_rate))
        .unwrap_or((Decimal::ZERO, Decimal::ZERO));

    let mut worked_minutes = 0i64;
    let mut days_present = 0u32;

    for date in ctx.period.days() {
        let punches = ctx.punches_on(date);
        if punches.is_empty() {
            continue;
        }

        days_present += 1;
        worked_minutes += punches
            .iter()
            .filter_map(|p| p.check_out.map(|out| (out - p.check_in).num_minutes().max(0)))
            .sum::<i64>();
    }

    let hours_worked = minutes_to_hours(worked_minutes);
    let hourly_total = hours_worked * hourly_rate;
    let daily_total = Decimal::from(days_present) * daily_rate;

    let details = SystemDetails::Hourly {
        hours_worked,
        hourly_total,
        days_present,
        daily_total,
    };

    // Pay-floor guarantee: whichever computation is larger.
    (hourly_total.max(daily_total), Decimal::ZERO, details)
}
