use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ApprovalStatus;

/// Audit trail for absence-transaction decisions.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transaction_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub absence_transaction_id: Uuid,
    pub old_status: ApprovalStatus,
    pub new_status: ApprovalStatus,
    pub changed_by: Uuid,
    pub changed_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::absence_transaction::Entity",
        from = "Column::AbsenceTransactionId",
        to = "super::absence_transaction::Column::Id"
    )]
    AbsenceTransaction,
}

impl ActiveModelBehavior for ActiveModel {}
