use std::collections::BTreeSet;

use uuid::Uuid;

use crate::entity::sea_orm_active_enums::ApprovalStatus;
use crate::entity::transaction_approval;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanInOutcome {
    /// At least one required approver has not decided yet.
    Pending,
    /// Every required approver approved.
    FullyApproved,
    /// Any single rejection closes the transaction.
    Rejected,
}

/// Folds the per-approver decision rows into the transaction-level outcome.
/// Decisions from approvers outside the required set are ignored.
pub fn fan_in_outcome(
    required: &BTreeSet<Uuid>,
    approvals: &[transaction_approval::Model],
) -> FanInOutcome {
    let mut approved = BTreeSet::new();

    for approval in approvals {
        if !required.contains(&approval.approver_id) {
            continue;
        }

        match approval.status {
            ApprovalStatus::Rejected => return FanInOutcome::Rejected,
            ApprovalStatus::Approved => {
                approved.insert(approval.approver_id);
            }
            ApprovalStatus::Pending => {}
        }
    }

    if !required.is_empty() && approved.len() == required.len() {
        FanInOutcome::FullyApproved
    } else {
        FanInOutcome::Pending
    }
}
