pub use super::absence_answer::Entity as AbsenceAnswer;
pub use super::absence_question::Entity as AbsenceQuestion;
pub use super::absence_transaction::Entity as AbsenceTransaction;
pub use super::advance::Entity as Advance;
pub use super::attendance::Entity as Attendance;
pub use super::branch::Entity as Branch;
pub use super::branch_manager::Entity as BranchManager;
pub use super::department::Entity as Department;
pub use super::department_manager::Entity as DepartmentManager;
pub use super::employee::Entity as Employee;
pub use super::holiday::Entity as Holiday;
pub use super::job_title::Entity as JobTitle;
pub use super::leave::Entity as Leave;
pub use super::monthly_attendance::Entity as MonthlyAttendance;
pub use super::penalty::Entity as Penalty;
pub use super::piece::Entity as Piece;
pub use super::piece_price::Entity as PiecePrice;
pub use super::production_monitoring::Entity as ProductionMonitoring;
pub use super::profession::Entity as Profession;
pub use super::reward::Entity as Reward;
pub use super::shift::Entity as Shift;
pub use super::shift_day::Entity as ShiftDay;
pub use super::transaction::Entity as Transaction;
pub use super::transaction_approval::Entity as TransactionApproval;
pub use super::transaction_history::Entity as TransactionHistory;
