pub mod authority;
pub mod details;
pub mod fanin;

pub use authority::OrgAuthority;
pub use details::TransactionDetails;
pub use fanin::{fan_in_outcome, FanInOutcome};
