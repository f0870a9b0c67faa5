use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entity::{
    advance, attendance, employee, holiday, job_title, leave, monthly_attendance, piece_price,
    production_monitoring, profession, sea_orm_active_enums::ApprovalStatus,
};
use crate::utils::prorate_monthly;

use super::reconcile::{self, DailyRecord, Punch};
use super::schedule::{self, OrgScope, ShiftSchedule};
use super::systems::{self, SystemDetails};
use super::{select_pay_system, PaySystem, Period};

/// Everything one payroll run needs for one employee, resolved up front so
/// the calculation itself is a pure function over this snapshot.
pub struct PayrollContext<'a> {
    pub employee: &'a employee::Model,
    pub job_title: Option<&'a job_title::Model>,
    pub profession: Option<&'a profession::Model>,
    pub schedule: Option<ShiftSchedule>,
    pub period: Period,
    pub attendances: &'a [attendance::Model],
    pub leaves: &'a [leave::Model],
    pub holidays: &'a [holiday::Model],
    pub monthly_days: &'a [monthly_attendance::Model],
    pub production: &'a [production_monitoring::Model],
    pub piece_prices: &'a [piece_price::Model],
    pub advances: &'a [advance::Model],
}

impl PayrollContext<'_> {
    pub fn scope(&self) -> OrgScope {
        OrgScope {
            branch_id: self.employee.branch_id,
            department_id: self.employee.department_id,
        }
    }

    pub fn pay_system(&self) -> PaySystem {
        select_pay_system(self.employee, self.job_title, self.profession)
    }

    /// Approved punches for one date, oldest first.
    pub fn punches_on(&self, date: chrono::NaiveDate) -> Vec<Punch> {
        let mut punches: Vec<Punch> = self
            .attendances
            .iter()
            .filter(|row| row.date == date && row.status == ApprovalStatus::Approved)
            .map(Punch::from)
            .collect();
        punches.sort_by_key(|p| p.check_in);

        punches
    }

    /// Classify + reconcile every day of the period.
    pub fn daily_records(&self) -> Vec<DailyRecord> {
        let scope = self.scope();

        self.period
            .days()
            .map(|date| {
                let class = schedule::classify(
                    date,
                    &scope,
                    self.schedule.as_ref(),
                    self.holidays,
                    self.leaves,
                );
                reconcile::reconcile(date, &class, &self.punches_on(date))
            })
            .collect()
    }
}

/// Final signed salary figure for one employee over one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryBreakdown {
    pub basic_salary: Decimal,
    pub allowances: Decimal,
    pub additions: Decimal,
    pub deductions: Decimal,
    pub net_salary: Decimal,
    pub system: PaySystem,
    pub system_details: SystemDetails,
}

/// Insurance prorated like the basic salary but clipped to its validity
/// window; a window with end ≤ start contributes nothing.
pub fn insurance_for_period(employee: &employee::Model, period: Period) -> Decimal {
    if employee.insurance_deduction.is_zero() {
        return Decimal::ZERO;
    }

    if let (Some(start), Some(end)) = (employee.insurance_start_date, employee.insurance_end_date) {
        if end <= start {
            return Decimal::ZERO;
        }
    }

    let clipped_start = employee.insurance_start_date.map_or(period.start, |s| s.max(period.start));
    let clipped_end = employee.insurance_end_date.map_or(period.end, |e| e.min(period.end));

    if clipped_end < clipped_start {
        return Decimal::ZERO;
    }

    prorate_monthly(employee.insurance_deduction, clipped_start, clipped_end)
}

/// Computes the period salary breakdown for one employee.
///
/// Basic salary and allowances are always month-overlap prorated; the
/// selected pay system contributes its own additions/deductions on top, and
/// advances dated inside the period are deducted regardless of system.
pub fn calculate_employee_salary_period(ctx: &PayrollContext) -> SalaryBreakdown {
    let basic_salary = prorate_monthly(ctx.employee.monthly_salary, ctx.period.start, ctx.period.end);
    let allowances = prorate_monthly(ctx.employee.allowances, ctx.period.start, ctx.period.end);

    let system = ctx.pay_system();
    let (additions, mut deductions, system_details) = match system {
        PaySystem::Monthly => systems::monthly(ctx),
        PaySystem::Shift => systems::shift(ctx),
        PaySystem::Production => systems::production(ctx),
        PaySystem::Hourly => systems::hourly(ctx),
        PaySystem::None => (Decimal::ZERO, Decimal::ZERO, SystemDetails::None),
    };

    deductions += insurance_for_period(ctx.employee, ctx.period);

    let advance_total: Decimal = ctx
        .advances
        .iter()
        .filter(|a| ctx.period.contains(a.date))
        .map(|a| a.amount)
        .sum();
    deductions += advance_total;

    let net_salary = basic_salary + allowances + additions - deductions;

    SalaryBreakdown {
        basic_salary,
        allowances,
        additions,
        deductions,
        net_salary,
        system,
        system_details,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use crate::payroll::fixtures;

    use super::*;

    fn period(start: (i32, u32, u32), end: (i32, u32, u32)) -> Period {
        Period::new(
            NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
        )
        .unwrap()
    }

    fn bare_context<'a>(
        employee: &'a crate::entity::employee::Model,
        period: Period,
    ) -> PayrollContext<'a> {
        PayrollContext {
            employee,
            job_title: None,
            profession: None,
            schedule: None,
            period,
            attendances: &[],
            leaves: &[],
            holidays: &[],
            monthly_days: &[],
            production: &[],
            piece_prices: &[],
            advances: &[],
        }
    }

    #[test]
    fn test_full_month_basic_is_exact() {
        let employee = fixtures::employee(dec!(3_000_000), dec!(100_000));
        let ctx = bare_context(&employee, period((2024, 6, 1), (2024, 6, 30)));

        let breakdown = calculate_employee_salary_period(&ctx);

        assert_eq!(breakdown.basic_salary, dec!(3_000_000));
        assert_eq!(breakdown.system, PaySystem::None);
    }

    #[test]
    fn test_net_identity_holds() {
        let mut employee = fixtures::employee(dec!(3000), dec!(100));
        employee.allowances = dec!(500);
        employee.insurance_deduction = dec!(90);
        let ctx = bare_context(&employee, period((2024, 6, 1), (2024, 6, 30)));

        let b = calculate_employee_salary_period(&ctx);

        assert_eq!(b.net_salary, b.basic_salary + b.allowances + b.additions - b.deductions);
        assert_eq!(b.deductions, dec!(90));
    }

    #[test]
    fn test_invalid_insurance_window_is_zero() {
        let mut employee = fixtures::employee(dec!(3000), dec!(100));
        employee.insurance_deduction = dec!(90);
        employee.insurance_start_date = NaiveDate::from_ymd_opt(2024, 6, 20);
        employee.insurance_end_date = NaiveDate::from_ymd_opt(2024, 6, 10);

        assert_eq!(insurance_for_period(&employee, period((2024, 6, 1), (2024, 6, 30))), Decimal::ZERO);
    }

    #[test]
    fn test_insurance_clipped_to_validity_window() {
        let mut employee = fixtures::employee(dec!(3000), dec!(100));
        employee.insurance_deduction = dec!(300);
        employee.insurance_start_date = NaiveDate::from_ymd_opt(2024, 6, 16);
        employee.insurance_end_date = NaiveDate::from_ymd_opt(2024, 12, 31);

        // Only 15 of June's 30 days are covered.
        let got = insurance_for_period(&employee, period((2024, 6, 1), (2024, 6, 30)));
        assert_eq!(got, dec!(150));
    }

    #[test]
    fn test_advances_always_deducted() {
        let employee = fixtures::employee(dec!(3000), dec!(100));
        let advances = [crate::entity::advance::Model {
            id: uuid::Uuid::new_v4(),
            created_at: chrono::Local::now().into(),
            updated_at: chrono::Local::now().into(),
            employee_id: employee.id,
            amount: dec!(250),
            date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            transaction_id: None,
        }];

        let mut ctx = bare_context(&employee, period((2024, 6, 1), (2024, 6, 30)));
        ctx.advances = &advances;

        let b = calculate_employee_salary_period(&ctx);
        assert_eq!(b.deductions, dec!(250));

        // An advance outside the period is ignored.
        let advances_outside = [crate::entity::advance::Model {
            date: NaiveDate::from_ymd_opt(2024, 7, 10).unwrap(),
            ..advances[0].clone()
        }];
        ctx.advances = &advances_outside;

        let b = calculate_employee_salary_period(&ctx);
        assert_eq!(b.deductions, Decimal::ZERO);
    }
}
