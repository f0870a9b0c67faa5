use std::{fmt::Debug, ops::Deref};

use actix_web::{body, dev, http::{self, header::ContentType, StatusCode}, web, FromRequest, HttpRequest, HttpResponse};
use chrono::{Duration, Local};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entity::{employee, sea_orm_active_enums::RoleType};

/// Poor man's authentication
///
/// Got no time setting up proper auth
pub struct Authority {
    jwt_key: (EncodingKey, DecodingKey),
}

impl Authority {
    pub fn new(jwt_key: &[u8]) -> Self {
        Self {
            jwt_key: (EncodingKey::from_secret(jwt_key), DecodingKey::from_secret(jwt_key))
        }
    }

    /// Issue a token for specified employee with 1 week of expiration time
    pub fn issue_for(&self, employee: &employee::Model) -> String {
        let claims = Claims {
            exp: (Local::now() + Duration::weeks(1)).timestamp(),
            data: employee
        };

        encode(&Header::default(), &claims, &self.jwt_key.0).unwrap()
    }

    pub fn authorize(&self, token: impl AsRef<str>) -> Result<employee::Model, AuthError> {
        let payload = decode::<Claims<employee::Model>>(token.as_ref(), &self.jwt_key.1, &Validation::default())?;

        Ok(payload.claims.data)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims<T> {
    exp: i64,
    data: T,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authority error")]
    AuthorityError(#[from] jsonwebtoken::errors::Error),
}

impl actix_web::error::ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse<body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::plaintext())
            .body(self.to_string())
    }

    fn status_code(&self) -> http::StatusCode {
        match self {
            AuthError::AuthorityError(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl FromRequest for employee::Model {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            // Basically grabs the value after space ( ) from `Authorization` header
            // Example: JWT sometoken
            //              ^ grabs this value
            let Some(Ok(Some((_, token)))) = req.headers()
                .get("Authorization")
                .map(|v|
                    v.to_str()
                        .map(|str| str.split_once(" "))
                )
            else {
                return Err(actix_web::error::ErrorUnauthorized("unauthorized"))
            };

            let authority = req.app_data::<web::Data<Authority>>().expect("Authority must be attached");
            let employee = authority.authorize(token)?;

            Ok(employee)
        })
    }
}

/// Manager or super admin. Approval endpoints take this and still re-check
/// per-employee authority against the org snapshot.
pub struct Manager(pub employee::Model);

impl Deref for Manager {
    type Target = employee::Model;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for Manager {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let employee = employee::Model::from_request(&req, &mut dev::Payload::None).await?;

            if employee.role == RoleType::Employee {
                return Err(actix_web::error::ErrorForbidden("forbidden"))
            }

            Ok(Self(employee))
        })
    }
}

pub struct SuperAdmin(pub employee::Model);

impl Deref for SuperAdmin {
    type Target = employee::Model;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for SuperAdmin {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let employee = employee::Model::from_request(&req, &mut dev::Payload::None).await?;

            if employee.role != RoleType::SuperAdmin {
                return Err(actix_web::error::ErrorForbidden("forbidden"))
            }

            Ok(Self(employee))
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{body::MessageBody, get, test, web, App, Responder};
    use rust_decimal_macros::dec;

    use crate::entity::sea_orm_active_enums::RoleType;
    use crate::payroll::fixtures;

    use super::*;

    fn employee_with_role(role: RoleType) -> employee::Model {
        let mut employee = fixtures::employee(dec!(3000), dec!(100));
        employee.role = role;
        employee
    }

    #[actix_web::test]
    async fn test_authority() {
        let authority = Authority::new(b"secret");

        let employee = employee_with_role(RoleType::Employee);

        let token = authority.issue_for(&employee);

        let authorized = authority.authorize(token).expect("Unable to authorize employee from token");
        assert_eq!(employee, authorized);
    }

    #[actix_web::test]
    async fn test_extractor() {
        let secret = b"secret";

        #[get("/")]
        async fn test_handler(employee: employee::Model) -> impl Responder {
            employee.id.to_string()
        }

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .service(test_handler)
        ).await;

        {
            let forbidden_req = test::TestRequest::default()
                .uri("/")
                .insert_header(("Authorization", "JWT wrong"))
                .to_request();

            let response = test::call_service(&app, forbidden_req).await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
        }

        {
            let unauthorized_req = test::TestRequest::default()
                .uri("/")
                .to_request();

            let response = test::call_service(&app, unauthorized_req).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }

        {
            let employee = employee_with_role(RoleType::Employee);

            let token = Authority::new(secret).issue_for(&employee);

            let authorized_req = test::TestRequest::default()
                .insert_header(("Authorization", format!("JWT {token}")))
                .to_request();

            let response = test::call_service(&app, authorized_req).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.into_body().try_into_bytes().unwrap(), employee.id.to_string().as_bytes());
        }
    }

    #[actix_web::test]
    async fn test_manager_extractor() {
        let secret = b"secret";

        #[get("/")]
        async fn test_handler(manager: Manager) -> impl Responder {
            assert_ne!(manager.role, RoleType::Employee);

            ""
        }

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .service(test_handler)
        ).await;

        {
            let manager = employee_with_role(RoleType::Manager);

            let token = Authority::new(secret).issue_for(&manager);

            let success_req = test::TestRequest::default()
                .insert_header(("Authorization", format!("JWT {token}")))
                .to_request();

            let response = test::call_service(&app, success_req).await;
            assert_eq!(response.status(), StatusCode::OK);
        }

        {
            let employee = employee_with_role(RoleType::Employee);

            let token = Authority::new(secret).issue_for(&employee);

            let forbidden_req = test::TestRequest::default()
                .insert_header(("Authorization", format!("JWT {token}")))
                .to_request();

            let response = test::call_service(&app, forbidden_req).await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
        }
    }

    #[actix_web::test]
    async fn test_super_admin_extractor() {
        let secret = b"secret";

        #[get("/")]
        async fn test_handler(admin: SuperAdmin) -> impl Responder {
            assert_eq!(admin.role, RoleType::SuperAdmin);

            ""
        }

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .service(test_handler)
        ).await;

        {
            let admin = employee_with_role(RoleType::SuperAdmin);

            let token = Authority::new(secret).issue_for(&admin);

            let success_req = test::TestRequest::default()
                .insert_header(("Authorization", format!("JWT {token}")))
                .to_request();

            let response = test::call_service(&app, success_req).await;
            assert_eq!(response.status(), StatusCode::OK);
        }

        {
            let manager = employee_with_role(RoleType::Manager);

            let token = Authority::new(secret).issue_for(&manager);

            let forbidden_req = test::TestRequest::default()
                .insert_header(("Authorization", format!("JWT {token}")))
                .to_request();

            let response = test::call_service(&app, forbidden_req).await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
        }
    }
}
