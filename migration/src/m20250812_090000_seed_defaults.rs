use sea_orm_migration::prelude::*;
use sha2::Digest as _;

use crate::m20250810_101500_init::{AbsenceQuestion, Employee};

#[derive(DeriveMigrationName)]
pub struct Migration;

const ADMIN_UUID: u128 = 0xad314;
const QUESTION_BASE: u128 = 0xab5e;

const DEFAULT_QUESTIONS: &[(&str, &str)] = &[
    ("Was the employee notified of the absence?", "0.5"),
    ("Did the absence disrupt scheduled work?", "1"),
    ("Has the employee been absent before this month?", "0.5"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let time = Expr::val("2025-08-12T09:00:00.000Z").cast_as("timestamptz");

        let hashed_password = &sha2::Sha256::digest("admin:admin")[..];

        manager
            .exec_stmt(Query::insert()
                .into_table(Employee::Table)
                .columns(["id", "created_at", "updated_at", "username", "password", "role"])
                .values_panic([Expr::val(format!("{ADMIN_UUID:032x}")).cast_as("uuid"), time.clone(), time.clone(), "admin".into(), hashed_password.into(), Expr::val("super_admin").cast_as("role_type")])
                .to_owned()
        ).await?;

        // Baseline absence questionnaire; values are day units.
        for (i, (question, deduction)) in DEFAULT_QUESTIONS.iter().enumerate() {
            manager
                .exec_stmt(Query::insert()
                    .into_table(AbsenceQuestion::Table)
                    .columns(["id", "created_at", "updated_at", "question", "deduction_value", "is_active"])
                    .values_panic([Expr::val(format!("{:032x}", QUESTION_BASE + i as u128)).cast_as("uuid"), time.clone(), time.clone(), (*question).into(), Expr::val(*deduction).cast_as("numeric"), true.into()])
                    .to_owned()
            ).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for i in 0..DEFAULT_QUESTIONS.len() {
            manager
                .exec_stmt(Query::delete()
                    .from_table(AbsenceQuestion::Table)
                    .and_where(Expr::col("id").eq(Expr::val(format!("{:032x}", QUESTION_BASE + i as u128)).cast_as("uuid")))
                    .to_owned()
            ).await?;
        }

        manager
            .exec_stmt(Query::delete()
                .from_table(Employee::Table)
                .and_where(Expr::col("id").eq(Expr::val(format!("{ADMIN_UUID:032x}")).cast_as("uuid")))
                .to_owned()
        ).await?;

        Ok(())
    }
}
