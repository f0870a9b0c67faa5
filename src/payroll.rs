use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entity::{employee, job_title, profession};

pub mod aggregate;
pub mod reconcile;
pub mod schedule;
pub mod systems;

/// Inclusive date range a payroll run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, crate::error::ApiError> {
        if end < start {
            return Err(crate::error::ApiError::Validation("period end is before period start".to_string()));
        }

        Ok(Self { start, end })
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        crate::utils::days_between(self.start, self.end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaySystem {
    Monthly,
    Shift,
    Production,
    Hourly,
    /// Neither a job title system flag nor a profession: no computed pay.
    None,
}

/// The job title's system flags win; a profession without a job title means
/// hourly; neither means no computed pay.
pub fn select_pay_system(
    employee: &employee::Model,
    job_title: Option<&job_title::Model>,
    profession: Option<&profession::Model>,
) -> PaySystem {
    if let Some(title) = job_title {
        if title.month_system {
            return PaySystem::Monthly;
        }
        if title.shift_system {
            return PaySystem::Shift;
        }
        if title.production_system {
            return PaySystem::Production;
        }
    }

    if employee.profession_id.is_some() && profession.is_some() {
        return PaySystem::Hourly;
    }

    PaySystem::None
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::Local;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::entity::{employee, job_title, profession, sea_orm_active_enums::RoleType};

    pub fn employee(monthly_salary: Decimal, daily_rate: Decimal) -> employee::Model {
        employee::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            username: "bob".to_string(),
            password: Vec::new(),
            role: RoleType::Employee,
            fingerprint_id: Some("42".to_string()),
            branch_id: None,
            department_id: None,
            job_title_id: None,
            profession_id: None,
            shift_id: None,
            monthly_salary,
            allowances: Decimal::ZERO,
            insurance_deduction: Decimal::ZERO,
            insurance_start_date: None,
            insurance_end_date: None,
            daily_rate,
            hourly_rate: Decimal::ZERO,
            overtime_multiplier: dec!(1.5),
        }
    }

    pub fn job_title(month: bool, shift: bool, production: bool) -> job_title::Model {
        job_title::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            name: "operator".to_string(),
            month_system: month,
            shift_system: shift,
            production_system: production,
            overtime_hour_value: dec!(10),
            delay_minute_value: dec!(0.5),
        }
    }

    pub fn profession(hourly_rate: Decimal, daily_rate: Decimal) -> profession::Model {
        profession::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            name: "welder".to_string(),
            hourly_rate,
            daily_rate,
        }
    }
}
