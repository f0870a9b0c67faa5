use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Pay-system selection lives on the job title: exactly one of the three
/// system flags may be set.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "job_title")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub name: String,
    pub month_system: bool,
    pub shift_system: bool,
    pub production_system: bool,
    /// Currency per overtime hour under the shift system.
    pub overtime_hour_value: Decimal,
    /// Currency per lateness/early-leave minute under the shift system.
    pub delay_minute_value: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
