use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Piece-rate production output for one employee on one date.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "production_monitoring")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub employee_id: Uuid,
    pub date: Date,
    pub piece_id: Uuid,
    pub grade: String,
    pub quantity: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id"
    )]
    Employee,
    #[sea_orm(
        belongs_to = "super::piece::Entity",
        from = "Column::PieceId",
        to = "super::piece::Column::Id"
    )]
    Piece,
}

impl ActiveModelBehavior for ActiveModel {}
