use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{ApprovalStatus, TransactionType};

/// Generic multi-approver transaction (advance/reward/penalty/leave).
/// `details` keeps the JSON wire shape; the crate parses it into the typed
/// `approval::TransactionDetails` union before acting on it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transaction")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    #[sea_orm(unique)]
    pub transaction_number: String,
    pub transaction_type: TransactionType,
    pub employee_id: Uuid,
    pub requested_by: Uuid,
    pub status: ApprovalStatus,
    pub details: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id"
    )]
    Employee,
    #[sea_orm(has_many = "super::transaction_approval::Entity")]
    TransactionApproval,
}

impl Related<super::transaction_approval::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionApproval.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
