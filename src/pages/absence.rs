use std::collections::{BTreeSet, HashMap};

use actix_web::{get, post, web, Responder};
use chrono::{Duration, Local};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::OnConflict, ActiveValue::{Set, Unchanged}, ColumnTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::absence::{absence_candidates, answered_deduction, transaction_number};
use crate::approval::OrgAuthority;
use crate::auth::Manager;
use crate::consts::ABSENCE_SWEEP_DAYS;
use crate::entity::{
    absence_answer, absence_transaction, attendance, holiday, leave, penalty,
    prelude::*, sea_orm_active_enums::ApprovalStatus, shift_day, transaction_history,
};
use crate::error::ApiError;
use crate::payroll::schedule::{OrgScope, ShiftSchedule};

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(list_pending)
        .service(decide);
}

/// Sweeps the trailing window for unexcused absences and files one pending
/// transaction per hit. The (employee, absence_date) unique constraint makes
/// a rerun a no-op, so this is safe to run on every read.
async fn run_sweep(db: &DatabaseConnection) -> Result<(), ApiError> {
    let now = Local::now();
    let today = now.date_naive();
    let window_start = today - Duration::days(ABSENCE_SWEEP_DAYS);

    let holidays = Holiday::find()
        .filter(holiday::Column::Date.between(window_start, today))
        .all(db).await?;

    let employees = Employee::find().all(db).await?;

    // Shifts are shared between employees; resolve each one once.
    let mut schedules: HashMap<Uuid, ShiftSchedule> = HashMap::new();
    for shift_id in employees.iter().filter_map(|e| e.shift_id) {
        if schedules.contains_key(&shift_id) {
            continue;
        }
        if let Some(shift) = Shift::find_by_id(shift_id).one(db).await? {
            let days = ShiftDay::find()
                .filter(shift_day::Column::ShiftId.eq(shift.id))
                .all(db).await?;
            schedules.insert(shift_id, ShiftSchedule::from_models(&shift, &days));
        }
    }

    let number_prefix = format!("ABS-{}-", today.format("%Y%m%d"));
    let mut issued_today = AbsenceTransaction::find()
        .filter(absence_transaction::Column::TransactionNumber.starts_with(&number_prefix))
        .count(db).await?;

    for employee in &employees {
        let leaves = Leave::find()
            .filter(leave::Column::EmployeeId.eq(employee.id))
            .all(db).await?;

        let attended: BTreeSet<_> = Attendance::find()
            .filter(attendance::Column::EmployeeId.eq(employee.id))
            .filter(attendance::Column::Date.between(window_start, today))
            .all(db).await?
            .into_iter()
            .map(|row| row.date)
            .collect();

        let transacted: BTreeSet<_> = AbsenceTransaction::find()
            .filter(absence_transaction::Column::EmployeeId.eq(employee.id))
            .filter(absence_transaction::Column::AbsenceDate.between(window_start, today))
            .all(db).await?
            .into_iter()
            .map(|row| row.absence_date)
            .collect();

        let scope = OrgScope {
            branch_id: employee.branch_id,
            department_id: employee.department_id,
        };
        let schedule = employee.shift_id.and_then(|id| schedules.get(&id));

        for candidate in absence_candidates(
            today,
            &scope,
            schedule,
            &holidays,
            &leaves,
            &attended,
            &transacted,
        ) {
            let model = absence_transaction::ActiveModel {
                id: Set(Uuid::new_v4()),
                created_at: Set(now.fixed_offset()),
                updated_at: Set(now.fixed_offset()),
                transaction_number: Set(transaction_number(today, issued_today)),
                employee_id: Set(employee.id),
                absence_date: Set(candidate.date),
                status: Set(ApprovalStatus::Pending),
                reason: Set(None),
                notes: Set(None),
                approver_id: Set(None),
                approved_at: Set(None),
            };

            // A concurrent sweep may have won the race; the conflict target
            // swallows the duplicate without failing the whole run.
            AbsenceTransaction::insert(model)
                .on_conflict(
                    OnConflict::columns([
                        absence_transaction::Column::EmployeeId,
                        absence_transaction::Column::AbsenceDate,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(db).await?;

            issued_today += 1;
        }
    }

    Ok(())
}

#[get("")]
async fn list_pending(db: web::Data<DatabaseConnection>, _manager: Manager) -> Result<impl Responder, ApiError> {
    run_sweep(db.as_ref()).await?;

    let rows = AbsenceTransaction::find()
        .filter(absence_transaction::Column::Status.eq(ApprovalStatus::Pending))
        .all(db.as_ref()).await?;

    Ok(web::Json(rows))
}

#[derive(Debug, Serialize, Deserialize)]
struct AnswerInput {
    question_id: Uuid,
    is_answered: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct AbsenceDecision {
    approve: bool,
    notes: Option<String>,
    #[serde(default)]
    answers: Vec<AnswerInput>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DecidedAbsence {
    transaction: absence_transaction::Model,
    deduction: Decimal,
}

/// Single-decision model: one authorized approver settles the transaction.
/// An approval records the questionnaire answers and levies the computed
/// deduction as a penalty ledger row; both paths write an audit history row.
#[post("/{absence_id}/decide")]
async fn decide(
    db: web::Data<DatabaseConnection>,
    manager: Manager,
    path: web::Path<Uuid>,
    payload: web::Json<AbsenceDecision>,
) -> Result<impl Responder, ApiError> {
    let absence_id = path.into_inner();
    let now = Local::now();

    let Some(row) = AbsenceTransaction::find_by_id(absence_id).one(db.as_ref()).await? else {
        return Err(ApiError::NotFound("absence transaction"));
    };

    if row.status != ApprovalStatus::Pending {
        return Err(ApiError::Conflict("absence transaction is already decided".to_string()));
    }

    let Some(target) = Employee::find_by_id(row.employee_id).one(db.as_ref()).await? else {
        return Err(ApiError::NotFound("employee"));
    };

    let authority = OrgAuthority::load(db.as_ref()).await?;
    if !authority.can_decide(manager.id, &target) {
        return Err(ApiError::Forbidden("no approval authority over this employee".to_string()));
    }

    let questions = AbsenceQuestion::find()
        .filter(crate::entity::absence_question::Column::IsActive.eq(true))
        .all(db.as_ref()).await?;

    for answer in &payload.answers {
        if !questions.iter().any(|q| q.id == answer.question_id) {
            return Err(ApiError::Validation(format!("unknown absence question `{}`", answer.question_id)));
        }
    }

    let new_status = if payload.approve { ApprovalStatus::Approved } else { ApprovalStatus::Rejected };

    let answer_models: Vec<absence_answer::Model> = payload.answers.iter()
        .map(|answer| absence_answer::Model {
            id: Uuid::new_v4(),
            created_at: now.fixed_offset(),
            updated_at: now.fixed_offset(),
            absence_transaction_id: row.id,
            absence_question_id: answer.question_id,
            is_answered: answer.is_answered,
        })
        .collect();

    let deduction = if payload.approve {
        answered_deduction(&answer_models, &questions, target.daily_rate)
    } else {
        Decimal::ZERO
    };

    let manager_id = manager.id;
    let notes = payload.notes.clone();
    let approve = payload.approve;
    let old_status = row.status;
    let row_for_txn = row.clone();

    let updated = db.as_ref()
        .transaction::<_, absence_transaction::Model, ApiError>(move |txn| Box::pin(async move {
            if approve {
                for answer in answer_models {
                    AbsenceAnswer::insert(absence_answer::ActiveModel {
                        id: Set(answer.id),
                        created_at: Set(answer.created_at),
                        updated_at: Set(answer.updated_at),
                        absence_transaction_id: Set(answer.absence_transaction_id),
                        absence_question_id: Set(answer.absence_question_id),
                        is_answered: Set(answer.is_answered),
                    }).exec(txn).await?;
                }

                if !deduction.is_zero() {
                    Penalty::insert(penalty::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        created_at: Set(now.fixed_offset()),
                        updated_at: Set(now.fixed_offset()),
                        employee_id: Set(row_for_txn.employee_id),
                        amount: Set(deduction),
                        date: Set(row_for_txn.absence_date),
                        reason: Set(Some("unexcused absence".to_string())),
                        transaction_id: Set(None),
                    }).exec(txn).await?;
                }
            }

            let updated = AbsenceTransaction::update(absence_transaction::ActiveModel {
                id: Unchanged(row_for_txn.id),
                status: Set(new_status),
                notes: Set(notes),
                approver_id: Set(Some(manager_id)),
                approved_at: Set(Some(now.fixed_offset())),
                updated_at: Set(now.fixed_offset()),
                ..Default::default()
            }).exec(txn).await?;

            TransactionHistory::insert(transaction_history::ActiveModel {
                id: Set(Uuid::new_v4()),
                created_at: Set(now.fixed_offset()),
                updated_at: Set(now.fixed_offset()),
                absence_transaction_id: Set(row_for_txn.id),
                old_status: Set(old_status),
                new_status: Set(new_status),
                changed_by: Set(manager_id),
                changed_at: Set(now.fixed_offset()),
            }).exec(txn).await?;

            Ok(updated)
        })).await
        .map_err(|err| match err {
            TransactionError::Connection(e) => ApiError::Database(e),
            TransactionError::Transaction(e) => e,
        })?;

    Ok(web::Json(DecidedAbsence { transaction: updated, deduction }))
}
