use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ApprovalStatus;

/// Single-decision absence workflow row; unique per (employee, absence_date).
/// Auto-created by the sweep, immutable once decided.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "absence_transaction")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    #[sea_orm(unique)]
    pub transaction_number: String,
    pub employee_id: Uuid,
    pub absence_date: Date,
    pub status: ApprovalStatus,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub approver_id: Option<Uuid>,
    pub approved_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id"
    )]
    Employee,
    #[sea_orm(has_many = "super::absence_answer::Entity")]
    AbsenceAnswer,
}

impl Related<super::absence_answer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AbsenceAnswer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
