use actix_web::{post, web, Responder};
use chrono::{Local, NaiveDate};
use sea_orm::{
    ActiveValue::{Set, Unchanged}, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Manager;
use crate::entity::{attendance, employee, prelude::*, sea_orm_active_enums::ApprovalStatus};
use crate::error::ApiError;
use crate::sync::{fold_group, group_punches, OpenRow, RawPunch};

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(ingest);
}

#[derive(Debug, Serialize, Deserialize)]
struct SyncBatch {
    punches: Vec<RawPunch>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SyncFailure {
    fingerprint_id: String,
    date: NaiveDate,
    error: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct SyncResult {
    merged: Vec<attendance::Model>,
    failures: Vec<SyncFailure>,
}

/// Folds a raw device batch into attendance rows, one row per employee per
/// day. Groups are processed independently; one bad group is reported in the
/// failure list and the rest of the batch still lands.
#[post("")]
async fn ingest(
    db: web::Data<DatabaseConnection>,
    _manager: Manager,
    payload: web::Json<SyncBatch>,
) -> Result<impl Responder, ApiError> {
    let groups = group_punches(payload.into_inner().punches);

    let mut merged = Vec::new();
    let mut failures = Vec::new();

    for ((fingerprint_id, date), group) in groups {
        let employee = Employee::find()
            .filter(employee::Column::FingerprintId.eq(&fingerprint_id))
            .one(db.as_ref()).await?;

        let Some(employee) = employee else {
            failures.push(SyncFailure {
                fingerprint_id,
                date,
                error: "unknown fingerprint id".to_string(),
            });
            continue;
        };

        match merge_group(db.as_ref(), &employee, date, &group).await {
            Ok(Some(row)) => merged.push(row),
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(%fingerprint_id, %date, %err, "fingerprint group merge failed");
                failures.push(SyncFailure {
                    fingerprint_id,
                    date,
                    error: err.to_string(),
                });
            }
        }
    }

    Ok(web::Json(SyncResult { merged, failures }))
}

/// Applies one sorted punch group against the stored row for employee+date,
/// holding a row lock so concurrent deliveries cannot lose updates.
async fn merge_group(
    db: &DatabaseConnection,
    employee: &employee::Model,
    date: NaiveDate,
    group: &[RawPunch],
) -> Result<Option<attendance::Model>, ApiError> {
    let now = Local::now();
    let employee_id = employee.id;
    let group = group.to_vec();

    let row = db
        .transaction::<_, Option<attendance::Model>, ApiError>(move |txn| Box::pin(async move {
            let stored = Attendance::find()
                .filter(attendance::Column::EmployeeId.eq(employee_id))
                .filter(attendance::Column::Date.eq(date))
                .order_by_asc(attendance::Column::CheckInTime)
                .lock_exclusive()
                .one(txn).await?;

            let current = stored.as_ref().map(|row| OpenRow {
                check_in: row.check_in_time,
                check_out: row.check_out_time,
            });

            let Some(folded) = fold_group(current, &group) else {
                return Ok(None);
            };

            if current == Some(folded) {
                // Pure re-delivery; nothing to write.
                return Ok(stored);
            }

            let row = match stored {
                Some(stored) => Attendance::update(attendance::ActiveModel {
                    id: Unchanged(stored.id),
                    check_in_time: Set(folded.check_in),
                    check_out_time: Set(folded.check_out),
                    updated_at: Set(now.fixed_offset()),
                    ..Default::default()
                }).exec(txn).await?,
                None => Attendance::insert(attendance::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    created_at: Set(now.fixed_offset()),
                    updated_at: Set(now.fixed_offset()),
                    created_by: Set(None),
                    updated_by: Set(None),
                    employee_id: Set(employee_id),
                    date: Set(date),
                    check_in_time: Set(folded.check_in),
                    check_out_time: Set(folded.check_out),
                    status: Set(ApprovalStatus::Approved),
                    production_quantity: Set(None),
                    reasons: Set(None),
                }).exec_with_returning(txn).await?,
            };

            Ok(Some(row))
        })).await
        .map_err(|err| match err {
            TransactionError::Connection(e) => ApiError::Database(e),
            TransactionError::Transaction(e) => e,
        })?;

    Ok(row)
}

#[cfg(test)]
mod tests {
    use actix_web::{test, App};
    use chrono::NaiveDateTime;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use crate::{auth::Authority, entity::sea_orm_active_enums::RoleType, payroll::fixtures};

    use super::*;

    fn at(date: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
        date.and_hms_opt(hour, minute, 0).unwrap()
    }

    #[actix_web::test]
    async fn test_unknown_fingerprint_lands_in_failures() {
        let secret = b"secret";

        let mut manager = fixtures::employee(dec!(3000), dec!(100));
        manager.role = RoleType::Manager;
        let token = Authority::new(secret).issue_for(&manager);

        // Lookup by fingerprint finds nobody.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<employee::Model>::new()]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(db.into_connection()))
                .service(web::scope("/sync").service(ingest))
        ).await;

        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let req = test::TestRequest::post()
            .uri("/sync")
            .insert_header(("Authorization", format!("JWT {token}")))
            .set_json(SyncBatch {
                punches: vec![RawPunch {
                    fingerprint_id: "9999".to_string(),
                    timestamp: at(date, 8, 0),
                    device: None,
                }],
            })
            .to_request();

        let result: SyncResult = test::call_and_read_body_json(&app, req).await;
        assert!(result.merged.is_empty());
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].fingerprint_id, "9999");
    }

    #[actix_web::test]
    async fn test_batch_creates_row_with_bounce_discarded() {
        let secret = b"secret";

        let mut manager = fixtures::employee(dec!(3000), dec!(100));
        manager.role = RoleType::Manager;
        let token = Authority::new(secret).issue_for(&manager);

        let mut device_employee = fixtures::employee(dec!(3000), dec!(100));
        device_employee.fingerprint_id = Some("1042".to_string());

        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let merged_row = attendance::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            created_by: None,
            updated_by: None,
            employee_id: device_employee.id,
            date,
            check_in_time: at(date, 8, 0),
            check_out_time: Some(at(date, 17, 5)),
            status: ApprovalStatus::Approved,
            production_quantity: None,
            reasons: None,
        };

        // employee lookup, then inside the txn: stored-row lookup (empty)
        // and the insert returning the merged row.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![device_employee.clone()]])
            .append_query_results([Vec::<attendance::Model>::new()])
            .append_query_results([vec![merged_row.clone()]])
            .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 1 }]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(db.into_connection()))
                .service(web::scope("/sync").service(ingest))
        ).await;

        // Delivered out of order; 08:02 is inside the bounce window.
        let req = test::TestRequest::post()
            .uri("/sync")
            .insert_header(("Authorization", format!("JWT {token}")))
            .set_json(SyncBatch {
                punches: vec![
                    RawPunch { fingerprint_id: "1042".to_string(), timestamp: at(date, 17, 5), device: None },
                    RawPunch { fingerprint_id: "1042".to_string(), timestamp: at(date, 8, 2), device: None },
                    RawPunch { fingerprint_id: "1042".to_string(), timestamp: at(date, 8, 0), device: None },
                ],
            })
            .to_request();

        let result: SyncResult = test::call_and_read_body_json(&app, req).await;
        assert!(result.failures.is_empty());
        assert_eq!(result.merged.len(), 1);
        assert_eq!(result.merged[0].check_in_time, at(date, 8, 0));
        assert_eq!(result.merged[0].check_out_time, Some(at(date, 17, 5)));
    }
}
