use actix_web::{get, post, web, Responder};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{auth::Authority, entity::{employee, prelude::*}, error::ApiError};

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(login)
        .service(whoami);
}

#[derive(Debug, Serialize, Deserialize)]
struct Login {
    username: String,
    password: String,
}

#[post("/login")]
async fn login(db: web::Data<DatabaseConnection>, authority: web::Data<Authority>, credentials: web::Json<Login>) -> Result<String, ApiError> {
    let hashed_password = &Sha256::digest(&format!("{}:{}", credentials.password, credentials.username))[..];

    let Some(employee) = Employee::find()
        .filter(employee::Column::Username.eq(&credentials.username))
        .filter(employee::Column::Password.eq(hashed_password))
        .one(db.get_ref()).await?
    else {
        return Err(ApiError::Forbidden("invalid credentials".to_string()));
    };

    Ok(authority.issue_for(&employee))
}

#[get("")]
async fn whoami(employee: employee::Model) -> impl Responder {
    web::Json(employee)
}
