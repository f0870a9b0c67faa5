use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shift")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub name: String,
    /// Grace window before a late check-in is penalized.
    pub allowed_delay_minutes: i32,
    /// Grace window before an early check-out is penalized.
    pub allowed_exit_minutes: i32,
    /// Daily break budget in minutes.
    pub allowed_break_minutes: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::shift_day::Entity")]
    ShiftDay,
}

impl Related<super::shift_day::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShiftDay.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
