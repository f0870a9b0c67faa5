use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Calendar exception. NULL branch/department means the holiday applies
/// globally; a set id scopes it to that org unit.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "holiday")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub date: Date,
    pub name: String,
    pub branch_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
