use actix_web::{get, post, web, HttpResponse, Responder};
use chrono::{Local, NaiveDate, NaiveTime};
use sea_orm::{
    ActiveValue::{Set, Unchanged}, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::approval::{fan_in_outcome, FanInOutcome, OrgAuthority, TransactionDetails};
use crate::auth::Manager;
use crate::entity::{
    advance, employee, leave, penalty, prelude::*, reward,
    sea_orm_active_enums::{ApprovalStatus, LeaveStatus, LeaveType, TransactionType},
    transaction, transaction_approval,
};
use crate::error::ApiError;
use crate::utils::minutes_to_hours;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(list_pending)
        .service(create_transaction)
        .service(decide);
}

async fn next_transaction_number(db: &impl ConnectionTrait, date: NaiveDate) -> Result<String, ApiError> {
    let prefix = format!("TRX-{}-", date.format("%Y%m%d"));

    let issued = Transaction::find()
        .filter(transaction::Column::TransactionNumber.starts_with(&prefix))
        .count(db).await?;

    Ok(format!("{prefix}{:04}", issued + 1))
}

#[derive(Debug, Serialize, Deserialize)]
struct CreateTransaction {
    employee_id: Uuid,
    transaction_type: TransactionType,
    details: serde_json::Value,
}

/// Files a transaction and fans out one pending approval row per required
/// approver, all in one database transaction. The details blob is validated
/// up front so a malformed request persists nothing.
#[post("")]
async fn create_transaction(
    db: web::Data<DatabaseConnection>,
    actor: employee::Model,
    payload: web::Json<CreateTransaction>,
) -> Result<impl Responder, ApiError> {
    let now = Local::now();
    let today = now.date_naive();

    let details = TransactionDetails::parse(payload.transaction_type, &payload.details, today)?;

    let Some(target) = Employee::find_by_id(payload.employee_id).one(db.as_ref()).await? else {
        return Err(ApiError::NotFound("employee"));
    };

    let authority = OrgAuthority::load(db.as_ref()).await?;
    let approvers = authority.required_approvers(&target);

    if approvers.is_empty() {
        return Err(ApiError::Validation("employee has no approvers configured".to_string()));
    }

    let transaction_number = next_transaction_number(db.as_ref(), today).await?;

    let transaction_type = payload.transaction_type;
    let target_id = target.id;
    let actor_id = actor.id;
    let details_json = serde_json::to_value(&details)
        .map_err(|err| ApiError::Validation(err.to_string()))?;

    let row = db.as_ref()
        .transaction::<_, transaction::Model, ApiError>(move |txn| Box::pin(async move {
            let row = Transaction::insert(transaction::ActiveModel {
                id: Set(Uuid::new_v4()),
                created_at: Set(now.fixed_offset()),
                updated_at: Set(now.fixed_offset()),
                transaction_number: Set(transaction_number),
                transaction_type: Set(transaction_type),
                employee_id: Set(target_id),
                requested_by: Set(actor_id),
                status: Set(ApprovalStatus::Pending),
                details: Set(details_json),
            }).exec_with_returning(txn).await?;

            for approver_id in approvers {
                TransactionApproval::insert(transaction_approval::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    created_at: Set(now.fixed_offset()),
                    updated_at: Set(now.fixed_offset()),
                    transaction_id: Set(row.id),
                    approver_id: Set(approver_id),
                    status: Set(ApprovalStatus::Pending),
                }).exec(txn).await?;
            }

            Ok(row)
        })).await
        .map_err(flatten_txn_err)?;

    Ok(HttpResponse::Created().json(web::Json(row)))
}

#[get("")]
async fn list_pending(db: web::Data<DatabaseConnection>, _manager: Manager) -> Result<impl Responder, ApiError> {
    let rows = Transaction::find()
        .filter(transaction::Column::Status.eq(ApprovalStatus::Pending))
        .all(db.as_ref()).await?;

    Ok(web::Json(rows))
}

#[derive(Debug, Serialize, Deserialize)]
struct Decision {
    approve: bool,
}

/// One approver's decision. A rejection closes the transaction immediately;
/// the approval that completes the fan-in materializes the final ledger row
/// and flips the transaction, atomically with the decision itself.
#[post("/{transaction_id}/decide")]
async fn decide(
    db: web::Data<DatabaseConnection>,
    manager: Manager,
    path: web::Path<Uuid>,
    payload: web::Json<Decision>,
) -> Result<impl Responder, ApiError> {
    let transaction_id = path.into_inner();
    let now = Local::now();

    let Some(tx_row) = Transaction::find_by_id(transaction_id).one(db.as_ref()).await? else {
        return Err(ApiError::NotFound("transaction"));
    };

    if tx_row.status != ApprovalStatus::Pending {
        return Err(ApiError::Conflict("transaction is already decided".to_string()));
    }

    let Some(target) = Employee::find_by_id(tx_row.employee_id).one(db.as_ref()).await? else {
        return Err(ApiError::NotFound("employee"));
    };

    // Fresh snapshot: a stale manager assignment must not still authorize.
    let authority = OrgAuthority::load(db.as_ref()).await?;
    if !authority.can_decide(manager.id, &target) {
        return Err(ApiError::Forbidden("no approval authority over this employee".to_string()));
    }

    let required = authority.required_approvers(&target);
    let decision = if payload.approve { ApprovalStatus::Approved } else { ApprovalStatus::Rejected };
    let manager_id = manager.id;

    let row = db.as_ref()
        .transaction::<_, transaction::Model, ApiError>(move |txn| Box::pin(async move {
            let Some(own_approval) = TransactionApproval::find()
                .filter(transaction_approval::Column::TransactionId.eq(tx_row.id))
                .filter(transaction_approval::Column::ApproverId.eq(manager_id))
                .one(txn).await?
            else {
                return Err(ApiError::Forbidden("not a required approver of this transaction".to_string()));
            };

            if own_approval.status != ApprovalStatus::Pending {
                return Err(ApiError::Conflict("approval is already decided".to_string()));
            }

            TransactionApproval::update(transaction_approval::ActiveModel {
                id: Unchanged(own_approval.id),
                status: Set(decision),
                updated_at: Set(now.fixed_offset()),
                ..Default::default()
            }).exec(txn).await?;

            let approvals = TransactionApproval::find()
                .filter(transaction_approval::Column::TransactionId.eq(tx_row.id))
                .all(txn).await?;

            let new_status = match fan_in_outcome(&required, &approvals) {
                FanInOutcome::Pending => return Ok(tx_row),
                FanInOutcome::Rejected => ApprovalStatus::Rejected,
                FanInOutcome::FullyApproved => {
                    create_final_record(txn, &tx_row, now.date_naive()).await?;
                    ApprovalStatus::Approved
                }
            };

            let row = Transaction::update(transaction::ActiveModel {
                id: Unchanged(tx_row.id),
                status: Set(new_status),
                updated_at: Set(now.fixed_offset()),
                ..Default::default()
            }).exec(txn).await?;

            Ok(row)
        })).await
        .map_err(flatten_txn_err)?;

    Ok(web::Json(row))
}

fn flatten_txn_err(err: TransactionError<ApiError>) -> ApiError {
    match err {
        TransactionError::Connection(e) => ApiError::Database(e),
        TransactionError::Transaction(e) => e,
    }
}

/// Inserts the concrete ledger row an approved transaction stands for.
/// Runs exactly once, on the approval that completes the fan-in; any error
/// here rolls the whole decision back.
async fn create_final_record(
    txn: &impl ConnectionTrait,
    tx_row: &transaction::Model,
    today: NaiveDate,
) -> Result<(), ApiError> {
    let now = Local::now();
    let details = TransactionDetails::parse(tx_row.transaction_type, &tx_row.details, today)?;

    match details {
        TransactionDetails::Advance { amount, date } => {
            Advance::insert(advance::ActiveModel {
                id: Set(Uuid::new_v4()),
                created_at: Set(now.fixed_offset()),
                updated_at: Set(now.fixed_offset()),
                employee_id: Set(tx_row.employee_id),
                amount: Set(amount),
                date: Set(date),
                transaction_id: Set(Some(tx_row.id)),
            }).exec(txn).await?;
        }
        TransactionDetails::Reward { amount, date, reason } => {
            Reward::insert(reward::ActiveModel {
                id: Set(Uuid::new_v4()),
                created_at: Set(now.fixed_offset()),
                updated_at: Set(now.fixed_offset()),
                employee_id: Set(tx_row.employee_id),
                amount: Set(amount),
                date: Set(date),
                reason: Set(reason),
                transaction_id: Set(Some(tx_row.id)),
            }).exec(txn).await?;
        }
        TransactionDetails::Penalty { amount, date, reason } => {
            Penalty::insert(penalty::ActiveModel {
                id: Set(Uuid::new_v4()),
                created_at: Set(now.fixed_offset()),
                updated_at: Set(now.fixed_offset()),
                employee_id: Set(tx_row.employee_id),
                amount: Set(amount),
                date: Set(date),
                reason: Set(reason),
                transaction_id: Set(Some(tx_row.id)),
            }).exec(txn).await?;
        }
        TransactionDetails::HourlyLeave { date, start_time, end_time } => {
            let hours = minutes_to_hours(span_minutes(start_time, end_time));

            Leave::insert(leave::ActiveModel {
                id: Set(Uuid::new_v4()),
                created_at: Set(now.fixed_offset()),
                updated_at: Set(now.fixed_offset()),
                employee_id: Set(tx_row.employee_id),
                leave_type: Set(LeaveType::Hourly),
                start_date: Set(date),
                end_date: Set(None),
                start_time: Set(Some(start_time)),
                end_time: Set(Some(end_time)),
                hours: Set(Some(hours)),
                days: Set(None),
                status: Set(LeaveStatus::Active),
                transaction_id: Set(Some(tx_row.id)),
            }).exec(txn).await?;
        }
        TransactionDetails::DailyLeave { start_date, end_date } => {
            let days = (end_date - start_date).num_days() as i32 + 1;

            Leave::insert(leave::ActiveModel {
                id: Set(Uuid::new_v4()),
                created_at: Set(now.fixed_offset()),
                updated_at: Set(now.fixed_offset()),
                employee_id: Set(tx_row.employee_id),
                leave_type: Set(LeaveType::Daily),
                start_date: Set(start_date),
                end_date: Set(Some(end_date)),
                start_time: Set(None),
                end_time: Set(None),
                hours: Set(None),
                days: Set(Some(days)),
                status: Set(LeaveStatus::Active),
                transaction_id: Set(Some(tx_row.id)),
            }).exec(txn).await?;
        }
    }

    Ok(())
}

fn span_minutes(start: NaiveTime, end: NaiveTime) -> i64 {
    (end - start).num_minutes()
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    use crate::{auth::Authority, payroll::fixtures};

    use super::*;

    #[actix_web::test]
    async fn test_create_rejects_malformed_details() {
        let secret = b"secret";

        let actor = fixtures::employee(dec!(3000), dec!(100));
        let token = Authority::new(secret).issue_for(&actor);

        let db = MockDatabase::new(DatabaseBackend::Postgres);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(db.into_connection()))
                .service(web::scope("/transactions").service(create_transaction))
        ).await;

        let req = test::TestRequest::post()
            .uri("/transactions")
            .insert_header(("Authorization", format!("JWT {token}")))
            .set_json(CreateTransaction {
                employee_id: Uuid::new_v4(),
                transaction_type: TransactionType::Advance,
                details: json!({ "amount": "not money", "date": "2024-06-10" }),
            })
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_decide_rejects_already_decided_transaction() {
        let secret = b"secret";

        let mut manager = fixtures::employee(dec!(3000), dec!(100));
        manager.role = crate::entity::sea_orm_active_enums::RoleType::Manager;
        let token = Authority::new(secret).issue_for(&manager);

        let now = Local::now();
        let decided = transaction::Model {
            id: Uuid::new_v4(),
            created_at: now.into(),
            updated_at: now.into(),
            transaction_number: "TRX-20240603-0001".to_string(),
            transaction_type: TransactionType::Advance,
            employee_id: Uuid::new_v4(),
            requested_by: Uuid::new_v4(),
            status: ApprovalStatus::Approved,
            details: json!({ "amount": 100, "date": "2024-06-03" }),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![decided.clone()]]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(db.into_connection()))
                .service(decide)
        ).await;

        let req = test::TestRequest::post()
            .uri(&format!("/{}/decide", decided.id))
            .insert_header(("Authorization", format!("JWT {token}")))
            .set_json(Decision { approve: true })
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
