use sea_orm_migration::{prelude::{extension::postgres::TypeDropStatement, *}, sea_orm::{ActiveEnum, DbBackend, DeriveActiveEnum, EnumIter, Schema}};

use crate::{setup_audit_fk, util::{default_audited_table_statement, default_table_statement, DefaultColumn}};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(DbBackend::Postgres);

        manager.create_type(schema.create_enum_from_active_enum::<RoleType>()).await?;
        manager.create_type(schema.create_enum_from_active_enum::<ApprovalStatus>()).await?;
        manager.create_type(schema.create_enum_from_active_enum::<LeaveType>()).await?;
        manager.create_type(schema.create_enum_from_active_enum::<LeaveStatus>()).await?;
        manager.create_type(schema.create_enum_from_active_enum::<MonthlyDayStatus>()).await?;
        manager.create_type(schema.create_enum_from_active_enum::<TransactionType>()).await?;
        manager.create_type(schema.create_enum_from_active_enum::<ManagerKind>()).await?;

        // Org structure first; employee references all of it.

        manager
            .create_table(default_table_statement()
                .table(Branch::Table)
                .col(ColumnDef::new(Branch::Name)
                    .text()
                    .unique_key()
                    .not_null())
                .take()
            ).await?;

        manager
            .create_table(default_table_statement()
                .table(Department::Table)
                .col(ColumnDef::new(Department::Name)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Department::BranchId)
                    .uuid())
                .take()
            ).await?;

        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(Department::Table, Department::BranchId)
            .to(Branch::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::SetNull)
            .take()
        ).await?;

        manager
            .create_table(default_table_statement()
                .table(JobTitle::Table)
                .col(ColumnDef::new(JobTitle::Name)
                    .text()
                    .not_null())
                .col(ColumnDef::new(JobTitle::MonthSystem)
                    .boolean()
                    .not_null()
                    .default(false))
                .col(ColumnDef::new(JobTitle::ShiftSystem)
                    .boolean()
                    .not_null()
                    .default(false))
                .col(ColumnDef::new(JobTitle::ProductionSystem)
                    .boolean()
                    .not_null()
                    .default(false))
                .col(ColumnDef::new(JobTitle::OvertimeHourValue)
                    .decimal()
                    .not_null()
                    .default(0))
                .col(ColumnDef::new(JobTitle::DelayMinuteValue)
                    .decimal()
                    .not_null()
                    .default(0))
                .take()
            ).await?;

        manager
            .create_table(default_table_statement()
                .table(Profession::Table)
                .col(ColumnDef::new(Profession::Name)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Profession::HourlyRate)
                    .decimal()
                    .not_null())
                .col(ColumnDef::new(Profession::DailyRate)
                    .decimal()
                    .not_null())
                .take()
            ).await?;

        manager
            .create_table(default_table_statement()
                .table(Shift::Table)
                .col(ColumnDef::new(Shift::Name)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Shift::AllowedDelayMinutes)
                    .integer()
                    .not_null()
                    .default(0))
                .col(ColumnDef::new(Shift::AllowedExitMinutes)
                    .integer()
                    .not_null()
                    .default(0))
                .col(ColumnDef::new(Shift::AllowedBreakMinutes)
                    .integer()
                    .not_null()
                    .default(0))
                .take()
            ).await?;

        manager
            .create_table(default_table_statement()
                .table(ShiftDay::Table)
                .col(ColumnDef::new(ShiftDay::ShiftId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(ShiftDay::Weekday)
                    .small_integer()
                    .not_null()) // 0 = Monday .. 6 = Sunday
                .col(ColumnDef::new(ShiftDay::IsActive)
                    .boolean()
                    .not_null()
                    .default(true))
                .col(ColumnDef::new(ShiftDay::StartTime)
                    .time())
                .col(ColumnDef::new(ShiftDay::EndTime)
                    .time())
                .take()
            ).await?;

        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(ShiftDay::Table, ShiftDay::ShiftId)
            .to(Shift::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .take()
        ).await?;

        manager.create_index(IndexCreateStatement::new()
            .name("idx_shift_day_unique")
            .table(ShiftDay::Table)
            .col(ShiftDay::ShiftId)
            .col(ShiftDay::Weekday)
            .unique()
            .take()
        ).await?;

        manager
            .create_table(default_table_statement()
                .table(Employee::Table)
                .col(ColumnDef::new(Employee::Username)
                    .text()
                    .unique_key()
                    .not_null())
                .col(ColumnDef::new(Employee::Password)
                    .binary()
                    .not_null()) // Password should be in a hashed format
                .col(ColumnDef::new(Employee::Role)
                    .custom(RoleType::name())
                    .not_null())
                .col(ColumnDef::new(Employee::FingerprintId)
                    .text()
                    .unique_key())
                .col(ColumnDef::new(Employee::BranchId)
                    .uuid())
                .col(ColumnDef::new(Employee::DepartmentId)
                    .uuid())
                .col(ColumnDef::new(Employee::JobTitleId)
                    .uuid())
                .col(ColumnDef::new(Employee::ProfessionId)
                    .uuid())
                .col(ColumnDef::new(Employee::ShiftId)
                    .uuid())
                .col(ColumnDef::new(Employee::MonthlySalary)
                    .decimal()
                    .not_null()
                    .default(0))
                .col(ColumnDef::new(Employee::Allowances)
                    .decimal()
                    .not_null()
                    .default(0))
                .col(ColumnDef::new(Employee::InsuranceDeduction)
                    .decimal()
                    .not_null()
                    .default(0))
                .col(ColumnDef::new(Employee::InsuranceStartDate)
                    .date())
                .col(ColumnDef::new(Employee::InsuranceEndDate)
                    .date())
                .col(ColumnDef::new(Employee::DailyRate)
                    .decimal()
                    .not_null()
                    .default(0))
                .col(ColumnDef::new(Employee::HourlyRate)
                    .decimal()
                    .not_null()
                    .default(0))
                .col(ColumnDef::new(Employee::OvertimeMultiplier)
                    .decimal()
                    .not_null()
                    .default(1))
                .take()
            ).await?;

        for (from, to) in [
            (Employee::BranchId, Branch::Table.into_table_ref()),
            (Employee::DepartmentId, Department::Table.into_table_ref()),
            (Employee::JobTitleId, JobTitle::Table.into_table_ref()),
            (Employee::ProfessionId, Profession::Table.into_table_ref()),
            (Employee::ShiftId, Shift::Table.into_table_ref()),
        ] {
            manager.create_foreign_key(ForeignKeyCreateStatement::new()
                .from(Employee::Table, from)
                .to(to, DefaultColumn::Id)
                .on_delete(ForeignKeyAction::SetNull)
                .take()
            ).await?;
        }

        manager
            .create_table(default_table_statement()
                .table(BranchManager::Table)
                .col(ColumnDef::new(BranchManager::BranchId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(BranchManager::EmployeeId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(BranchManager::Kind)
                    .custom(ManagerKind::name())
                    .not_null())
                .take()
            ).await?;

        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(BranchManager::Table, BranchManager::BranchId)
            .to(Branch::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .take()
        ).await?;
        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(BranchManager::Table, BranchManager::EmployeeId)
            .to(Employee::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .take()
        ).await?;

        manager
            .create_table(default_table_statement()
                .table(DepartmentManager::Table)
                .col(ColumnDef::new(DepartmentManager::DepartmentId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(DepartmentManager::EmployeeId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(DepartmentManager::Kind)
                    .custom(ManagerKind::name())
                    .not_null())
                .take()
            ).await?;

        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(DepartmentManager::Table, DepartmentManager::DepartmentId)
            .to(Department::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .take()
        ).await?;
        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(DepartmentManager::Table, DepartmentManager::EmployeeId)
            .to(Employee::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .take()
        ).await?;

        manager
            .create_table(default_table_statement()
                .table(Holiday::Table)
                .col(ColumnDef::new(Holiday::Date)
                    .date()
                    .not_null())
                .col(ColumnDef::new(Holiday::Name)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Holiday::BranchId)
                    .uuid())
                .col(ColumnDef::new(Holiday::DepartmentId)
                    .uuid())
                .col(ColumnDef::new(Holiday::IsActive)
                    .boolean()
                    .not_null()
                    .default(true))
                .take()
            ).await?;

        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(Holiday::Table, Holiday::BranchId)
            .to(Branch::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .take()
        ).await?;
        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(Holiday::Table, Holiday::DepartmentId)
            .to(Department::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .take()
        ).await?;

        manager
            .create_table(default_audited_table_statement()
                .table(Attendance::Table)
                .col(ColumnDef::new(Attendance::EmployeeId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(Attendance::Date)
                    .date()
                    .not_null())
                .col(ColumnDef::new(Attendance::CheckInTime)
                    .date_time()
                    .not_null())
                .col(ColumnDef::new(Attendance::CheckOutTime)
                    .date_time())
                .col(ColumnDef::new(Attendance::Status)
                    .custom(ApprovalStatus::name())
                    .not_null())
                .col(ColumnDef::new(Attendance::ProductionQuantity)
                    .decimal())
                .col(ColumnDef::new(Attendance::Reasons)
                    .text())
                .take()
            ).await?;
        setup_audit_fk!(manager, Attendance::Table);

        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(Attendance::Table, Attendance::EmployeeId)
            .to(Employee::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .take()
        ).await?;

        manager
            .create_table(default_table_statement()
                .table(Transaction::Table)
                .col(ColumnDef::new(Transaction::TransactionNumber)
                    .text()
                    .unique_key()
                    .not_null())
                .col(ColumnDef::new(Transaction::TransactionType)
                    .custom(TransactionType::name())
                    .not_null())
                .col(ColumnDef::new(Transaction::EmployeeId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(Transaction::RequestedBy)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(Transaction::Status)
                    .custom(ApprovalStatus::name())
                    .not_null())
                .col(ColumnDef::new(Transaction::Details)
                    .json_binary()
                    .not_null())
                .take()
            ).await?;

        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(Transaction::Table, Transaction::EmployeeId)
            .to(Employee::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .take()
        ).await?;
        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(Transaction::Table, Transaction::RequestedBy)
            .to(Employee::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .take()
        ).await?;

        manager
            .create_table(default_table_statement()
                .table(TransactionApproval::Table)
                .col(ColumnDef::new(TransactionApproval::TransactionId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(TransactionApproval::ApproverId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(TransactionApproval::Status)
                    .custom(ApprovalStatus::name())
                    .not_null())
                .take()
            ).await?;

        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(TransactionApproval::Table, TransactionApproval::TransactionId)
            .to(Transaction::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .take()
        ).await?;
        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(TransactionApproval::Table, TransactionApproval::ApproverId)
            .to(Employee::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .take()
        ).await?;

        manager.create_index(IndexCreateStatement::new()
            .name("idx_transaction_approval_unique")
            .table(TransactionApproval::Table)
            .col(TransactionApproval::TransactionId)
            .col(TransactionApproval::ApproverId)
            .unique()
            .take()
        ).await?;

        manager
            .create_table(default_table_statement()
                .table(Leave::Table)
                .col(ColumnDef::new(Leave::EmployeeId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(Leave::LeaveType)
                    .custom(LeaveType::name())
                    .not_null())
                .col(ColumnDef::new(Leave::StartDate)
                    .date()
                    .not_null())
                .col(ColumnDef::new(Leave::EndDate)
                    .date())
                .col(ColumnDef::new(Leave::StartTime)
                    .time())
                .col(ColumnDef::new(Leave::EndTime)
                    .time())
                .col(ColumnDef::new(Leave::Hours)
                    .decimal())
                .col(ColumnDef::new(Leave::Days)
                    .integer())
                .col(ColumnDef::new(Leave::Status)
                    .custom(LeaveStatus::name())
                    .not_null())
                .col(ColumnDef::new(Leave::TransactionId)
                    .uuid())
                .take()
            ).await?;

        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(Leave::Table, Leave::EmployeeId)
            .to(Employee::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .take()
        ).await?;
        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(Leave::Table, Leave::TransactionId)
            .to(Transaction::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::SetNull)
            .take()
        ).await?;

        manager
            .create_table(default_table_statement()
                .table(MonthlyAttendance::Table)
                .col(ColumnDef::new(MonthlyAttendance::EmployeeId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(MonthlyAttendance::Date)
                    .date()
                    .not_null())
                .col(ColumnDef::new(MonthlyAttendance::DayStatus)
                    .custom(MonthlyDayStatus::name())
                    .not_null())
                .take()
            ).await?;

        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(MonthlyAttendance::Table, MonthlyAttendance::EmployeeId)
            .to(Employee::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .take()
        ).await?;

        manager.create_index(IndexCreateStatement::new()
            .name("idx_monthly_attendance_unique")
            .table(MonthlyAttendance::Table)
            .col(MonthlyAttendance::EmployeeId)
            .col(MonthlyAttendance::Date)
            .unique()
            .take()
        ).await?;

        manager
            .create_table(default_table_statement()
                .table(Piece::Table)
                .col(ColumnDef::new(Piece::Name)
                    .text()
                    .not_null())
                .take()
            ).await?;

        manager
            .create_table(default_table_statement()
                .table(PiecePrice::Table)
                .col(ColumnDef::new(PiecePrice::PieceId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(PiecePrice::Grade)
                    .text()
                    .not_null())
                .col(ColumnDef::new(PiecePrice::Price)
                    .decimal()
                    .not_null())
                .take()
            ).await?;

        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(PiecePrice::Table, PiecePrice::PieceId)
            .to(Piece::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .take()
        ).await?;

        manager.create_index(IndexCreateStatement::new()
            .name("idx_piece_price_unique")
            .table(PiecePrice::Table)
            .col(PiecePrice::PieceId)
            .col(PiecePrice::Grade)
            .unique()
            .take()
        ).await?;

        manager
            .create_table(default_table_statement()
                .table(ProductionMonitoring::Table)
                .col(ColumnDef::new(ProductionMonitoring::EmployeeId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(ProductionMonitoring::Date)
                    .date()
                    .not_null())
                .col(ColumnDef::new(ProductionMonitoring::PieceId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(ProductionMonitoring::Grade)
                    .text()
                    .not_null())
                .col(ColumnDef::new(ProductionMonitoring::Quantity)
                    .decimal()
                    .not_null())
                .take()
            ).await?;

        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(ProductionMonitoring::Table, ProductionMonitoring::EmployeeId)
            .to(Employee::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .take()
        ).await?;
        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(ProductionMonitoring::Table, ProductionMonitoring::PieceId)
            .to(Piece::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .take()
        ).await?;

        // Advances carry no free-text reason; the other two ledgers do.
        for (table, has_reason) in [
            (Advance::Table.into_table_ref(), false),
            (Reward::Table.into_table_ref(), true),
            (Penalty::Table.into_table_ref(), true),
        ] {
            let mut statement = default_table_statement()
                .table(table.clone())
                .col(ColumnDef::new(Ledger::EmployeeId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(Ledger::Amount)
                    .decimal()
                    .not_null())
                .col(ColumnDef::new(Ledger::Date)
                    .date()
                    .not_null())
                .col(ColumnDef::new(Ledger::TransactionId)
                    .uuid())
                .take();

            if has_reason {
                statement = statement
                    .col(ColumnDef::new(Ledger::Reason)
                        .text())
                    .take();
            }

            manager.create_table(statement).await?;

            manager.create_foreign_key(ForeignKeyCreateStatement::new()
                .from(table.clone(), Ledger::EmployeeId)
                .to(Employee::Table, DefaultColumn::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .take()
            ).await?;
            manager.create_foreign_key(ForeignKeyCreateStatement::new()
                .from(table, Ledger::TransactionId)
                .to(Transaction::Table, DefaultColumn::Id)
                .on_delete(ForeignKeyAction::SetNull)
                .take()
            ).await?;
        }

        manager
            .create_table(default_table_statement()
                .table(AbsenceTransaction::Table)
                .col(ColumnDef::new(AbsenceTransaction::TransactionNumber)
                    .text()
                    .unique_key()
                    .not_null())
                .col(ColumnDef::new(AbsenceTransaction::EmployeeId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(AbsenceTransaction::AbsenceDate)
                    .date()
                    .not_null())
                .col(ColumnDef::new(AbsenceTransaction::Status)
                    .custom(ApprovalStatus::name())
                    .not_null())
                .col(ColumnDef::new(AbsenceTransaction::Reason)
                    .text())
                .col(ColumnDef::new(AbsenceTransaction::Notes)
                    .text())
                .col(ColumnDef::new(AbsenceTransaction::ApproverId)
                    .uuid())
                .col(ColumnDef::new(AbsenceTransaction::ApprovedAt)
                    .timestamp_with_time_zone())
                .take()
            ).await?;

        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(AbsenceTransaction::Table, AbsenceTransaction::EmployeeId)
            .to(Employee::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .take()
        ).await?;
        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(AbsenceTransaction::Table, AbsenceTransaction::ApproverId)
            .to(Employee::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::SetNull)
            .take()
        ).await?;

        // The sweep's idempotence hinges on this constraint.
        manager.create_index(IndexCreateStatement::new()
            .name("idx_absence_transaction_unique")
            .table(AbsenceTransaction::Table)
            .col(AbsenceTransaction::EmployeeId)
            .col(AbsenceTransaction::AbsenceDate)
            .unique()
            .take()
        ).await?;

        manager
            .create_table(default_table_statement()
                .table(AbsenceQuestion::Table)
                .col(ColumnDef::new(AbsenceQuestion::Question)
                    .text()
                    .not_null())
                .col(ColumnDef::new(AbsenceQuestion::DeductionValue)
                    .decimal()
                    .not_null())
                .col(ColumnDef::new(AbsenceQuestion::IsActive)
                    .boolean()
                    .not_null()
                    .default(true))
                .take()
            ).await?;

        manager
            .create_table(default_table_statement()
                .table(AbsenceAnswer::Table)
                .col(ColumnDef::new(AbsenceAnswer::AbsenceTransactionId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(AbsenceAnswer::AbsenceQuestionId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(AbsenceAnswer::IsAnswered)
                    .boolean()
                    .not_null()
                    .default(false))
                .take()
            ).await?;

        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(AbsenceAnswer::Table, AbsenceAnswer::AbsenceTransactionId)
            .to(AbsenceTransaction::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .take()
        ).await?;
        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(AbsenceAnswer::Table, AbsenceAnswer::AbsenceQuestionId)
            .to(AbsenceQuestion::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .take()
        ).await?;

        manager
            .create_table(default_table_statement()
                .table(TransactionHistory::Table)
                .col(ColumnDef::new(TransactionHistory::AbsenceTransactionId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(TransactionHistory::OldStatus)
                    .custom(ApprovalStatus::name())
                    .not_null())
                .col(ColumnDef::new(TransactionHistory::NewStatus)
                    .custom(ApprovalStatus::name())
                    .not_null())
                .col(ColumnDef::new(TransactionHistory::ChangedBy)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(TransactionHistory::ChangedAt)
                    .timestamp_with_time_zone()
                    .not_null())
                .take()
            ).await?;

        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(TransactionHistory::Table, TransactionHistory::AbsenceTransactionId)
            .to(AbsenceTransaction::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .take()
        ).await?;
        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(TransactionHistory::Table, TransactionHistory::ChangedBy)
            .to(Employee::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .take()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            TransactionHistory::Table.into_table_ref(),
            AbsenceAnswer::Table.into_table_ref(),
            AbsenceQuestion::Table.into_table_ref(),
            AbsenceTransaction::Table.into_table_ref(),
            Penalty::Table.into_table_ref(),
            Reward::Table.into_table_ref(),
            Advance::Table.into_table_ref(),
            ProductionMonitoring::Table.into_table_ref(),
            PiecePrice::Table.into_table_ref(),
            Piece::Table.into_table_ref(),
            MonthlyAttendance::Table.into_table_ref(),
            Leave::Table.into_table_ref(),
            TransactionApproval::Table.into_table_ref(),
            Transaction::Table.into_table_ref(),
            Attendance::Table.into_table_ref(),
            Holiday::Table.into_table_ref(),
            DepartmentManager::Table.into_table_ref(),
            BranchManager::Table.into_table_ref(),
            Employee::Table.into_table_ref(),
            ShiftDay::Table.into_table_ref(),
            Shift::Table.into_table_ref(),
            Profession::Table.into_table_ref(),
            JobTitle::Table.into_table_ref(),
            Department::Table.into_table_ref(),
            Branch::Table.into_table_ref(),
        ] {
            manager.drop_table(TableDropStatement::new().table(table).take()).await?;
        }

        manager.drop_type(TypeDropStatement::new().name(ManagerKind::name()).to_owned()).await?;
        manager.drop_type(TypeDropStatement::new().name(TransactionType::name()).to_owned()).await?;
        manager.drop_type(TypeDropStatement::new().name(MonthlyDayStatus::name()).to_owned()).await?;
        manager.drop_type(TypeDropStatement::new().name(LeaveStatus::name()).to_owned()).await?;
        manager.drop_type(TypeDropStatement::new().name(LeaveType::name()).to_owned()).await?;
        manager.drop_type(TypeDropStatement::new().name(ApprovalStatus::name()).to_owned()).await?;
        manager.drop_type(TypeDropStatement::new().name(RoleType::name()).to_owned()).await?;

        Ok(())
    }
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "role_type")]
enum RoleType {
    #[sea_orm(string_value = "employee")]
    Employee,
    #[sea_orm(string_value = "manager")]
    Manager,
    #[sea_orm(string_value = "super_admin")]
    SuperAdmin,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "approval_status")]
enum ApprovalStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "leave_type")]
enum LeaveType {
    #[sea_orm(string_value = "hourly")]
    Hourly,
    #[sea_orm(string_value = "daily")]
    Daily,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "leave_status")]
enum LeaveStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "expired")]
    Expired,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "monthly_day_status")]
enum MonthlyDayStatus {
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

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_type")]
enum TransactionType {
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

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "manager_kind")]
enum ManagerKind {
    #[sea_orm(string_value = "head")]
    Head,
    #[sea_orm(string_value = "deputy")]
    Deputy,
}

#[derive(Iden)]
pub(crate) enum Employee {
    Table,
    Username,
    Password,
    Role,
    FingerprintId,
    BranchId,
    DepartmentId,
    JobTitleId,
    ProfessionId,
    ShiftId,
    MonthlySalary,
    Allowances,
    InsuranceDeduction,
    InsuranceStartDate,
    InsuranceEndDate,
    DailyRate,
    HourlyRate,
    OvertimeMultiplier,
}

#[derive(Iden)]
enum Branch {
    Table,
    Name,
}

#[derive(Iden)]
enum Department {
    Table,
    Name,
    BranchId,
}

#[derive(Iden)]
enum BranchManager {
    Table,
    BranchId,
    EmployeeId,
    Kind,
}

#[derive(Iden)]
enum DepartmentManager {
    Table,
    DepartmentId,
    EmployeeId,
    Kind,
}

#[derive(Iden)]
enum JobTitle {
    Table,
    Name,
    MonthSystem,
    ShiftSystem,
    ProductionSystem,
    OvertimeHourValue,
    DelayMinuteValue,
}

#[derive(Iden)]
enum Profession {
    Table,
    Name,
    HourlyRate,
    DailyRate,
}

#[derive(Iden)]
enum Shift {
    Table,
    Name,
    AllowedDelayMinutes,
    AllowedExitMinutes,
    AllowedBreakMinutes,
}

#[derive(Iden)]
enum ShiftDay {
    Table,
    ShiftId,
    Weekday,
    IsActive,
    StartTime,
    EndTime,
}

#[derive(Iden)]
enum Holiday {
    Table,
    Date,
    Name,
    BranchId,
    DepartmentId,
    IsActive,
}

#[derive(Iden)]
enum Attendance {
    Table,
    EmployeeId,
    Date,
    CheckInTime,
    CheckOutTime,
    Status,
    ProductionQuantity,
    Reasons,
}

#[derive(Iden)]
enum Leave {
    Table,
    EmployeeId,
    LeaveType,
    StartDate,
    EndDate,
    StartTime,
    EndTime,
    Hours,
    Days,
    Status,
    TransactionId,
}

#[derive(Iden)]
enum MonthlyAttendance {
    Table,
    EmployeeId,
    Date,
    DayStatus,
}

#[derive(Iden)]
enum Piece {
    Table,
    Name,
}

#[derive(Iden)]
enum PiecePrice {
    Table,
    PieceId,
    Grade,
    Price,
}

#[derive(Iden)]
enum ProductionMonitoring {
    Table,
    EmployeeId,
    Date,
    PieceId,
    Grade,
    Quantity,
}

#[derive(Iden)]
enum Advance {
    Table,
}

#[derive(Iden)]
enum Reward {
    Table,
}

#[derive(Iden)]
enum Penalty {
    Table,
}

/// Columns shared by the advance/reward/penalty ledgers.
#[derive(Iden)]
enum Ledger {
    EmployeeId,
    Amount,
    Date,
    Reason,
    TransactionId,
}

#[derive(Iden)]
enum Transaction {
    Table,
    TransactionNumber,
    TransactionType,
    EmployeeId,
    RequestedBy,
    Status,
    Details,
}

#[derive(Iden)]
enum TransactionApproval {
    Table,
    TransactionId,
    ApproverId,
    Status,
}

#[derive(Iden)]
enum AbsenceTransaction {
    Table,
    TransactionNumber,
    EmployeeId,
    AbsenceDate,
    Status,
    Reason,
    Notes,
    ApproverId,
    ApprovedAt,
}

#[derive(Iden)]
pub(crate) enum AbsenceQuestion {
    Table,
    Question,
    DeductionValue,
    IsActive,
}

#[derive(Iden)]
enum AbsenceAnswer {
    Table,
    AbsenceTransactionId,
    AbsenceQuestionId,
    IsAnswered,
}

#[derive(Iden)]
enum TransactionHistory {
    Table,
    AbsenceTransactionId,
    OldStatus,
    NewStatus,
    ChangedBy,
    ChangedAt,
}
