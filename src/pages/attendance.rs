use std::str::FromStr;

use actix_web::{dev, get, post, web, FromRequest, HttpRequest, HttpResponse, Responder};
use chrono::Local;
use futures_util::future::LocalBoxFuture;
use sea_orm::{ActiveValue::{Set, Unchanged}, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{auth::Manager, entity::{attendance, employee, prelude::*, sea_orm_active_enums::{ApprovalStatus, RoleType}}, error::ApiError, payroll::Period};

use extractor::PendingAttendance;
use model::*;

use super::payroll::PeriodData;

mod extractor;
mod model;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(check_in)
        .service(check_out)
        .service(decide_status)
        .service(get_summary);
}

fn resolve_target(actor: &employee::Model, requested: Option<Uuid>) -> Result<(Uuid, bool), ApiError> {
    let target = requested.unwrap_or(actor.id);

    // Punching on behalf of someone else is a management action.
    if target != actor.id && actor.role == RoleType::Employee {
        return Err(ApiError::Forbidden("cannot punch for another employee".to_string()));
    }

    Ok((target, actor.role != RoleType::Employee))
}

/// Opens a new attendance row for today. A self punch lands pending; a
/// manager punch is approved immediately. Several closed rows per day are
/// fine, a second open one is not.
#[post("/check-in")]
async fn check_in(db: web::Data<DatabaseConnection>, actor: employee::Model, payload: web::Json<CheckIn>) -> Result<impl Responder, ApiError> {
    let (target, is_manager) = resolve_target(&actor, payload.employee_id)?;

    let now = Local::now();
    let today = now.date_naive();

    let open = Attendance::find()
        .filter(attendance::Column::EmployeeId.eq(target))
        .filter(attendance::Column::Date.eq(today))
        .filter(attendance::Column::CheckOutTime.is_null())
        .one(db.as_ref()).await?;

    if open.is_some() {
        return Err(ApiError::Conflict("already checked in".to_string()));
    }

    let status = if is_manager { ApprovalStatus::Approved } else { ApprovalStatus::Pending };

    let model = attendance::ActiveModel {
        id: Set(Uuid::new_v4()),
        created_at: Set(now.fixed_offset()),
        updated_at: Set(now.fixed_offset()),
        created_by: Set(Some(actor.id)),
        updated_by: Set(Some(actor.id)),
        employee_id: Set(target),
        date: Set(today),
        check_in_time: Set(now.naive_local()),
        check_out_time: Set(None),
        status: Set(status),
        production_quantity: Set(payload.production_quantity),
        reasons: Set(payload.reasons.clone()),
    };

    let row = Attendance::insert(model)
        .exec_with_returning(db.as_ref()).await?;

    Ok(HttpResponse::Created().json(web::Json(row)))
}

/// Closes today's open attendance row.
#[post("/check-out")]
async fn check_out(db: web::Data<DatabaseConnection>, actor: employee::Model, payload: web::Json<CheckOut>) -> Result<impl Responder, ApiError> {
    let (target, _) = resolve_target(&actor, payload.employee_id)?;

    let now = Local::now();
    let today = now.date_naive();

    let Some(open) = Attendance::find()
        .filter(attendance::Column::EmployeeId.eq(target))
        .filter(attendance::Column::Date.eq(today))
        .filter(attendance::Column::CheckOutTime.is_null())
        .order_by_desc(attendance::Column::CheckInTime)
        .one(db.as_ref()).await?
    else {
        return Err(ApiError::Conflict("no open check-in today".to_string()));
    };

    let row = Attendance::update(attendance::ActiveModel {
        id: Unchanged(open.id),
        check_out_time: Set(Some(now.naive_local())),
        updated_by: Set(Some(actor.id)),
        updated_at: Set(now.fixed_offset()),
        ..Default::default()
    }).exec(db.as_ref()).await?;

    Ok(HttpResponse::Ok().json(web::Json(row)))
}

/// Manager decision on a pending row. Decided rows are terminal; the
/// [`PendingAttendance`] extractor rejects them before this runs.
#[post("/{attendance_id}/status")]
async fn decide_status(db: web::Data<DatabaseConnection>, manager: Manager, attendance: PendingAttendance, payload: web::Json<StatusDecision>) -> Result<impl Responder, ApiError> {
    let status = if payload.approve { ApprovalStatus::Approved } else { ApprovalStatus::Rejected };

    let row = Attendance::update(attendance::ActiveModel {
        id: Unchanged(attendance.id),
        status: Set(status),
        updated_by: Set(Some(manager.id)),
        updated_at: Set(Local::now().fixed_offset()),
        ..Default::default()
    }).exec(db.as_ref()).await?;

    Ok(HttpResponse::Ok().json(web::Json(row)))
}

/// Day-by-day reconciliation of one employee over a period: lateness,
/// early leave, overtime, and outcome per calendar day.
#[get("/summary/{employee_id}")]
async fn get_summary(
    db: web::Data<DatabaseConnection>,
    actor: employee::Model,
    path: web::Path<Uuid>,
    query: web::Query<SummaryQuery>,
) -> Result<impl Responder, ApiError> {
    let employee_id = path.into_inner();

    if actor.role == RoleType::Employee && actor.id != employee_id {
        return Err(ApiError::Forbidden("cannot read another employee's attendance".to_string()));
    }

    let period = Period::new(query.start, query.end)?;

    let Some(target) = Employee::find_by_id(employee_id).one(db.as_ref()).await? else {
        return Err(ApiError::NotFound("employee"));
    };

    let data = PeriodData::load(db.as_ref(), target, period).await?;
    let records = data.context().daily_records();

    Ok(web::Json(DailySummary { employee_id, records }))
}
