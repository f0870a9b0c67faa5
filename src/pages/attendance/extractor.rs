use std::ops::Deref;

use super::*;

impl FromRequest for attendance::Model {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let attendance_id = req.match_info().get("attendance_id").expect("This extractor must be used under `attendance_id` path");
            let Ok(attendance_id) = Uuid::from_str(attendance_id) else {
                return Err(actix_web::error::ErrorBadRequest("invalid `attendance_id`"))
            };

            let db = req.app_data::<web::Data<DatabaseConnection>>().expect("DatabaseConnection must be attached");

            let Some(attendance) = Attendance::find_by_id(attendance_id)
                .one(db.as_ref()).await.map_err(ApiError::from)?
            else {
                return Err(actix_web::error::ErrorNotFound(""))
            };

            Ok(attendance)
        })
    }
}

/// Attendance row still awaiting a status decision. Decided rows are
/// immutable, so every mutating endpoint takes this instead of the bare
/// model.
pub(super) struct PendingAttendance(pub(super) attendance::Model);

impl Deref for PendingAttendance {
    type Target = attendance::Model;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for PendingAttendance {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let attendance = attendance::Model::from_request(&req, &mut dev::Payload::None).await?;

            if attendance.status != ApprovalStatus::Pending {
                return Err(actix_web::error::ErrorBadRequest("attendance is already decided"));
            }

            Ok(Self(attendance))
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use chrono::Local;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::{auth::Authority, payroll::fixtures};

    use super::*;

    fn attendance_row(employee_id: Uuid, status: ApprovalStatus) -> attendance::Model {
        let now = Local::now();

        attendance::Model {
            id: Uuid::new_v4(),
            created_at: now.into(),
            updated_at: now.into(),
            created_by: Some(employee_id),
            updated_by: Some(employee_id),
            employee_id,
            date: now.date_naive(),
            check_in_time: now.naive_local(),
            check_out_time: None,
            status,
            production_quantity: None,
            reasons: None,
        }
    }

    #[actix_web::test]
    async fn test_attendance_extractor() {
        #[get("/{attendance_id}")]
        async fn test_handler(attendance: attendance::Model) -> impl Responder {
            web::Json(attendance)
        }

        let secret = b"secret";

        let employee = fixtures::employee(dec!(3000), dec!(100));
        let attendance = attendance_row(employee.id, ApprovalStatus::Pending);

        let token = Authority::new(secret).issue_for(&employee);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ attendance.clone() ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(db.into_connection()))
                .service(test_handler)
        ).await;

        let req = test::TestRequest::default()
            .uri(&format!("/{}", attendance.id))
            .insert_header(("Authorization", format!("JWT {token}")))
            .to_request();

        let returned: attendance::Model = test::call_and_read_body_json(&app, req).await;
        assert_eq!(returned, attendance);
    }

    #[actix_web::test]
    async fn test_pending_attendance_extractor() {
        #[get("/{attendance_id}")]
        async fn test_handler(attendance: PendingAttendance) -> impl Responder {
            web::Json(attendance.0)
        }

        let secret = b"secret";

        let employee = fixtures::employee(dec!(3000), dec!(100));
        let pending = attendance_row(employee.id, ApprovalStatus::Pending);
        let decided = attendance_row(employee.id, ApprovalStatus::Approved);

        let token = Authority::new(secret).issue_for(&employee);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ pending.clone() ],
                vec![ decided.clone() ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(db.into_connection()))
                .service(test_handler)
        ).await;

        let req = test::TestRequest::default()
            .uri(&format!("/{}", pending.id))
            .insert_header(("Authorization", format!("JWT {token}")))
            .to_request();

        let returned: attendance::Model = test::call_and_read_body_json(&app, req).await;
        assert_eq!(returned, pending);

        let req = test::TestRequest::default()
            .uri(&format!("/{}", decided.id))
            .insert_header(("Authorization", format!("JWT {token}")))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
