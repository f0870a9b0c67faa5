use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "role_type")]
#[serde(rename_all = "snake_case")]
pub enum RoleType {
    #[sea_orm(string_value = "employee")]
    Employee,
    #[sea_orm(string_value = "manager")]
    Manager,
    #[sea_orm(string_value = "super_admin")]
    SuperAdmin,
}

/// Shared pending/approved/rejected lifecycle for attendances, transactions
/// and approvals. Both terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "approval_status")]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "leave_type")]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    #[sea_orm(string_value = "hourly")]
    Hourly,
    #[sea_orm(string_value = "daily")]
    Daily,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "leave_status")]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "expired")]
    Expired,
}

/// Coarse per-day status used by the monthly pay system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "monthly_day_status")]
#[serde(rename_all = "snake_case")]
pub enum MonthlyDayStatus {
    #[sea_orm(string_value = "full_day")]
    FullDay,
    #[sea_orm(string_value = "half_day")]
    HalfDay,
    #[sea_orm(string_value = "online_day")]
    OnlineDay,
    #[sea_orm(string_value = "excused_absence")]
    ExcusedAbsence,
    #[sea_orm(string_value = "unexcused_absence")]
    UnexcusedAbsence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_type")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    #[sea_orm(string_value = "advance")]
    Advance,
    #[sea_orm(string_value = "reward")]
    Reward,
    #[sea_orm(string_value = "penalty")]
    Penalty,
    #[sea_orm(string_value = "hourly_leave")]
    HourlyLeave,
    #[sea_orm(string_value = "daily_leave")]
    DailyLeave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "manager_kind")]
#[serde(rename_all = "snake_case")]
pub enum ManagerKind {
    #[sea_orm(string_value = "head")]
    Head,
    #[sea_orm(string_value = "deputy")]
    Deputy,
}
