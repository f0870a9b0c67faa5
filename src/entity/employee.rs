use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::RoleType;

/// Employee identity plus pay configuration. Auth columns (username,
/// password, role) live here as well; there is no separate user table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employee")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    #[sea_orm(unique)]
    pub username: String,
    pub password: Vec<u8>,
    pub role: RoleType,
    /// Badge id reported by fingerprint devices.
    #[sea_orm(unique)]
    pub fingerprint_id: Option<String>,
    pub branch_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub job_title_id: Option<Uuid>,
    pub profession_id: Option<Uuid>,
    pub shift_id: Option<Uuid>,
    pub monthly_salary: Decimal,
    pub allowances: Decimal,
    pub insurance_deduction: Decimal,
    pub insurance_start_date: Option<Date>,
    pub insurance_end_date: Option<Date>,
    pub daily_rate: Decimal,
    pub hourly_rate: Decimal,
    pub overtime_multiplier: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::branch::Entity",
        from = "Column::BranchId",
        to = "super::branch::Column::Id"
    )]
    Branch,
    #[sea_orm(
        belongs_to = "super::department::Entity",
        from = "Column::DepartmentId",
        to = "super::department::Column::Id"
    )]
    Department,
    #[sea_orm(
        belongs_to = "super::job_title::Entity",
        from = "Column::JobTitleId",
        to = "super::job_title::Column::Id"
    )]
    JobTitle,
    #[sea_orm(
        belongs_to = "super::profession::Entity",
        from = "Column::ProfessionId",
        to = "super::profession::Column::Id"
    )]
    Profession,
    #[sea_orm(
        belongs_to = "super::shift::Entity",
        from = "Column::ShiftId",
        to = "super::shift::Column::Id"
    )]
    Shift,
}

impl Related<super::shift::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shift.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
