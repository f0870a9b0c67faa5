use rust_decimal::Decimal;

use crate::payroll::reconcile::DailyRecord;

use super::*;

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct CheckIn {
    /// Managers may punch on behalf of another employee.
    pub(super) employee_id: Option<Uuid>,
    pub(super) reasons: Option<String>,
    pub(super) production_quantity: Option<Decimal>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct CheckOut {
    pub(super) employee_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct StatusDecision {
    pub(super) approve: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct SummaryQuery {
    pub(super) start: chrono::NaiveDate,
    pub(super) end: chrono::NaiveDate,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct DailySummary {
    pub(super) employee_id: Uuid,
    pub(super) records: Vec<DailyRecord>,
}
