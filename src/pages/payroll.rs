use actix_web::{get, post, web, Responder};
use chrono::NaiveDate;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Manager;
use crate::entity::{
    advance, attendance, employee, holiday, job_title, leave, monthly_attendance,
    prelude::*, production_monitoring, profession, sea_orm_active_enums::RoleType,
    shift_day,
};
use crate::error::ApiError;
use crate::payroll::aggregate::{calculate_employee_salary_period, PayrollContext, SalaryBreakdown};
use crate::payroll::schedule::ShiftSchedule;
use crate::payroll::Period;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(get_employee_salary)
        .service(calculate_batch);
}

/// Owned snapshot of everything one payroll run reads, loaded in one pass so
/// the calculation never touches the database.
pub(super) struct PeriodData {
    pub(super) employee: employee::Model,
    job_title: Option<job_title::Model>,
    profession: Option<profession::Model>,
    schedule: Option<ShiftSchedule>,
    period: Period,
    attendances: Vec<attendance::Model>,
    leaves: Vec<leave::Model>,
    holidays: Vec<holiday::Model>,
    monthly_days: Vec<monthly_attendance::Model>,
    production: Vec<production_monitoring::Model>,
    piece_prices: Vec<crate::entity::piece_price::Model>,
    advances: Vec<advance::Model>,
}

impl PeriodData {
    pub(super) async fn load(
        db: &DatabaseConnection,
        employee: employee::Model,
        period: Period,
    ) -> Result<Self, ApiError> {
        let job_title = match employee.job_title_id {
            Some(id) => JobTitle::find_by_id(id).one(db).await?,
            None => None,
        };

        let profession = match employee.profession_id {
            Some(id) => Profession::find_by_id(id).one(db).await?,
            None => None,
        };

        let schedule = match employee.shift_id {
            Some(id) => match Shift::find_by_id(id).one(db).await? {
                Some(shift) => {
                    let days = ShiftDay::find()
                        .filter(shift_day::Column::ShiftId.eq(shift.id))
                        .all(db).await?;

                    Some(ShiftSchedule::from_models(&shift, &days))
                }
                None => None,
            },
            None => None,
        };

        let attendances = Attendance::find()
            .filter(attendance::Column::EmployeeId.eq(employee.id))
            .filter(attendance::Column::Date.between(period.start, period.end))
            .all(db).await?;

        let leaves = Leave::find()
            .filter(leave::Column::EmployeeId.eq(employee.id))
            .all(db).await?;

        let holidays = Holiday::find()
            .filter(holiday::Column::Date.between(period.start, period.end))
            .all(db).await?;

        let monthly_days = MonthlyAttendance::find()
            .filter(monthly_attendance::Column::EmployeeId.eq(employee.id))
            .filter(monthly_attendance::Column::Date.between(period.start, period.end))
            .all(db).await?;

        let production = ProductionMonitoring::find()
            .filter(production_monitoring::Column::EmployeeId.eq(employee.id))
            .filter(production_monitoring::Column::Date.between(period.start, period.end))
            .all(db).await?;

        let piece_prices = PiecePrice::find().all(db).await?;

        let advances = Advance::find()
            .filter(advance::Column::EmployeeId.eq(employee.id))
            .filter(advance::Column::Date.between(period.start, period.end))
            .all(db).await?;

        Ok(Self {
            employee,
            job_title,
            profession,
            schedule,
            period,
            attendances,
            leaves,
            holidays,
            monthly_days,
            production,
            piece_prices,
            advances,
        })
    }

    pub(super) fn context(&self) -> PayrollContext<'_> {
        PayrollContext {
            employee: &self.employee,
            job_title: self.job_title.as_ref(),
            profession: self.profession.as_ref(),
            schedule: self.schedule.clone(),
            period: self.period,
            attendances: &self.attendances,
            leaves: &self.leaves,
            holidays: &self.holidays,
            monthly_days: &self.monthly_days,
            production: &self.production,
            piece_prices: &self.piece_prices,
            advances: &self.advances,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PeriodQuery {
    start: NaiveDate,
    end: NaiveDate,
}

impl PeriodQuery {
    fn period(&self) -> Result<Period, ApiError> {
        Period::new(self.start, self.end)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct EmployeeSalary {
    employee_id: Uuid,
    username: String,
    breakdown: SalaryBreakdown,
}

#[get("/{employee_id}")]
async fn get_employee_salary(
    db: web::Data<DatabaseConnection>,
    actor: employee::Model,
    path: web::Path<Uuid>,
    query: web::Query<PeriodQuery>,
) -> Result<impl Responder, ApiError> {
    let employee_id = path.into_inner();

    // Regular employees may only read their own breakdown.
    if actor.role == RoleType::Employee && actor.id != employee_id {
        return Err(ApiError::Forbidden("cannot read another employee's salary".to_string()));
    }

    let period = query.period()?;

    let Some(employee) = Employee::find_by_id(employee_id).one(db.as_ref()).await? else {
        return Err(ApiError::NotFound("employee"));
    };

    let username = employee.username.clone();
    let data = PeriodData::load(db.as_ref(), employee, period).await?;
    let breakdown = calculate_employee_salary_period(&data.context());

    Ok(web::Json(EmployeeSalary {
        employee_id,
        username,
        breakdown,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
struct BatchRequest {
    start: NaiveDate,
    end: NaiveDate,
    /// Absent means every employee.
    employee_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct BatchEntry {
    employee_id: Uuid,
    username: String,
    breakdown: Option<SalaryBreakdown>,
    error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct BatchResult {
    entries: Vec<BatchEntry>,
    failed: usize,
}

/// Period payroll for many employees at once. A failure for one employee is
/// recorded on their entry; the rest of the batch still completes.
#[post("")]
async fn calculate_batch(
    db: web::Data<DatabaseConnection>,
    _manager: Manager,
    payload: web::Json<BatchRequest>,
) -> Result<impl Responder, ApiError> {
    let period = Period::new(payload.start, payload.end)?;

    let mut query = Employee::find();
    if let Some(ids) = &payload.employee_ids {
        query = query.filter(employee::Column::Id.is_in(ids.clone()));
    }
    let employees = query.all(db.as_ref()).await?;

    let mut entries = Vec::with_capacity(employees.len());
    let mut failed = 0;

    for employee in employees {
        let employee_id = employee.id;
        let username = employee.username.clone();

        match PeriodData::load(db.as_ref(), employee, period).await {
            Ok(data) => {
                let breakdown = calculate_employee_salary_period(&data.context());
                entries.push(BatchEntry {
                    employee_id,
                    username,
                    breakdown: Some(breakdown),
                    error: None,
                });
            }
            Err(err) => {
                tracing::warn!(%employee_id, %err, "payroll calculation failed for employee");
                failed += 1;
                entries.push(BatchEntry {
                    employee_id,
                    username,
                    breakdown: None,
                    error: Some(err.to_string()),
                });
            }
        }
    }

    Ok(web::Json(BatchResult { entries, failed }))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::auth::Authority;
    use crate::payroll::fixtures;

    use super::*;

    #[actix_web::test]
    async fn test_employee_cannot_read_other_salaries() {
        let secret = b"secret";

        let actor = fixtures::employee(dec!(3000), dec!(100));

        let token = Authority::new(secret).issue_for(&actor);

        let db = MockDatabase::new(DatabaseBackend::Postgres);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(db.into_connection()))
                .service(get_employee_salary)
        ).await;

        let req = test::TestRequest::default()
            .uri(&format!("/{}?start=2024-06-01&end=2024-06-30", Uuid::new_v4()))
            .insert_header(("Authorization", format!("JWT {token}")))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_invalid_period_is_rejected() {
        let secret = b"secret";

        let actor = fixtures::employee(dec!(3000), dec!(100));
        let token = Authority::new(secret).issue_for(&actor);

        let db = MockDatabase::new(DatabaseBackend::Postgres);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(db.into_connection()))
                .service(get_employee_salary)
        ).await;

        let req = test::TestRequest::default()
            .uri(&format!("/{}?start=2024-06-30&end=2024-06-01", actor.id))
            .insert_header(("Authorization", format!("JWT {token}")))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_single_salary_for_self() {
        let secret = b"secret";

        let mut actor = fixtures::employee(dec!(3000), dec!(100));
        actor.allowances = dec!(300);
        let token = Authority::new(secret).issue_for(&actor);

        // find_by_id, then the context loads: attendances, leaves, holidays,
        // monthly days, production, piece prices, advances.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![actor.clone()]])
            .append_query_results([Vec::<attendance::Model>::new()])
            .append_query_results([Vec::<leave::Model>::new()])
            .append_query_results([Vec::<holiday::Model>::new()])
            .append_query_results([Vec::<monthly_attendance::Model>::new()])
            .append_query_results([Vec::<production_monitoring::Model>::new()])
            .append_query_results([Vec::<crate::entity::piece_price::Model>::new()])
            .append_query_results([Vec::<advance::Model>::new()]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(db.into_connection()))
                .service(get_employee_salary)
        ).await;

        let req = test::TestRequest::default()
            .uri(&format!("/{}?start=2024-06-01&end=2024-06-30", actor.id))
            .insert_header(("Authorization", format!("JWT {token}")))
            .to_request();

        let salary: EmployeeSalary = test::call_and_read_body_json(&app, req).await;
        assert_eq!(salary.employee_id, actor.id);
        assert_eq!(salary.breakdown.basic_salary, dec!(3000));
        assert_eq!(salary.breakdown.allowances, dec!(300));
        assert_eq!(
            salary.breakdown.net_salary,
            salary.breakdown.basic_salary + salary.breakdown.allowances
                + salary.breakdown.additions - salary.breakdown.deductions
        );
    }
}
