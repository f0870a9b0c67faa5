use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Yes/no answer recorded against one active absence question when an
/// absence transaction is approved.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "absence_answer")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub absence_transaction_id: Uuid,
    pub absence_question_id: Uuid,
    pub is_answered: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::absence_transaction::Entity",
        from = "Column::AbsenceTransactionId",
        to = "super::absence_transaction::Column::Id"
    )]
    AbsenceTransaction,
    #[sea_orm(
        belongs_to = "super::absence_question::Entity",
        from = "Column::AbsenceQuestionId",
        to = "super::absence_question::Column::Id"
    )]
    AbsenceQuestion,
}

impl Related<super::absence_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AbsenceTransaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
