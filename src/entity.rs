pub mod prelude;
pub mod sea_orm_active_enums;

pub mod absence_answer;
pub mod absence_question;
pub mod absence_transaction;
pub mod advance;
pub mod attendance;
pub mod branch;
pub mod branch_manager;
pub mod department;
pub mod department_manager;
pub mod employee;
pub mod holiday;
pub mod job_title;
pub mod leave;
pub mod monthly_attendance;
pub mod penalty;
pub mod piece;
pub mod piece_price;
pub mod production_monitoring;
pub mod profession;
pub mod reward;
pub mod shift;
pub mod shift_day;
pub mod transaction;
pub mod transaction_approval;
pub mod transaction_history;
