use std::collections::{BTreeSet, HashMap, HashSet};

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entity::{branch_manager, department_manager, employee, prelude::*, sea_orm_active_enums::RoleType};
use crate::error::ApiError;

/// Per-request snapshot of the organizational management assignments.
///
/// Resolved once per call and passed down, so every authority decision in a
/// request sees the same assignments even if they change concurrently.
#[derive(Debug, Clone, Default)]
pub struct OrgAuthority {
    super_admins: HashSet<Uuid>,
    branch_managers: HashMap<Uuid, HashSet<Uuid>>,
    department_managers: HashMap<Uuid, HashSet<Uuid>>,
}

impl OrgAuthority {
    pub fn new(
        super_admins: impl IntoIterator<Item = Uuid>,
        branch_managers: impl IntoIterator<Item = (Uuid, Uuid)>,
        department_managers: impl IntoIterator<Item = (Uuid, Uuid)>,
    ) -> Self {
        let mut snapshot = Self {
            super_admins: super_admins.into_iter().collect(),
            ..Self::default()
        };

        for (branch_id, manager_id) in branch_managers {
            snapshot.branch_managers.entry(branch_id).or_default().insert(manager_id);
        }
        for (department_id, manager_id) in department_managers {
            snapshot.department_managers.entry(department_id).or_default().insert(manager_id);
        }

        snapshot
    }

    /// Loads the current assignments fresh; decisions are made against the
    /// state at decision time, never against a cached creation-time view.
    pub async fn load(db: &impl ConnectionTrait) -> Result<Self, ApiError> {
        let super_admins = Employee::find()
            .filter(employee::Column::Role.eq(RoleType::SuperAdmin))
            .all(db)
            .await?
            .into_iter()
            .map(|admin| admin.id);

        let branch_managers = BranchManager::find()
            .all(db)
            .await?
            .into_iter()
            .map(|row: branch_manager::Model| (row.branch_id, row.employee_id));

        let department_managers = DepartmentManager::find()
            .all(db)
            .await?
            .into_iter()
            .map(|row: department_manager::Model| (row.department_id, row.employee_id));

        Ok(Self::new(super_admins, branch_managers, department_managers))
    }

    /// True when `actor` is a super admin, or heads/deputizes the employee's
    /// branch or department.
    pub fn can_decide(&self, actor: Uuid, employee: &employee::Model) -> bool {
        if self.super_admins.contains(&actor) {
            return true;
        }

        if let Some(branch_id) = employee.branch_id {
            if self.branch_managers.get(&branch_id).is_some_and(|m| m.contains(&actor)) {
                return true;
            }
        }

        if let Some(department_id) = employee.department_id {
            if self.department_managers.get(&department_id).is_some_and(|m| m.contains(&actor)) {
                return true;
            }
        }

        false
    }

    /// The de-duplicated fan-in set: the employee's branch managers, the
    /// employee's department managers and every super admin.
    pub fn required_approvers(&self, employee: &employee::Model) -> BTreeSet<Uuid> {
        let mut approvers: BTreeSet<Uuid> = self.super_admins.iter().copied().collect();

        if let Some(branch_id) = employee.branch_id {
            if let Some(managers) = self.branch_managers.get(&branch_id) {
                approvers.extend(managers.iter().copied());
            }
        }

        if let Some(department_id) = employee.department_id {
            if let Some(managers) = self.department_managers.get(&department_id) {
                approvers.extend(managers.iter().copied());
            }
        }

        approvers
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::payroll::fixtures;

    use super::*;

    #[test]
    fn test_can_decide_by_role_and_placement() {
        let super_admin = Uuid::new_v4();
        let branch_id = Uuid::new_v4();
        let department_id = Uuid::new_v4();
        let branch_head = Uuid::new_v4();
        let department_deputy = Uuid::new_v4();
        let bystander = Uuid::new_v4();

        let authority = OrgAuthority::new(
            [super_admin],
            [(branch_id, branch_head)],
            [(department_id, department_deputy)],
        );

        let mut employee = fixtures::employee(dec!(3000), dec!(100));
        employee.branch_id = Some(branch_id);
        employee.department_id = Some(department_id);

        assert!(authority.can_decide(super_admin, &employee));
        assert!(authority.can_decide(branch_head, &employee));
        assert!(authority.can_decide(department_deputy, &employee));
        assert!(!authority.can_decide(bystander, &employee));

        // A manager of some other branch has no authority here.
        let other_branch_head = Uuid::new_v4();
        let authority = OrgAuthority::new([], [(Uuid::new_v4(), other_branch_head)], []);
        assert!(!authority.can_decide(other_branch_head, &employee));
    }

    #[test]
    fn test_required_approvers_deduplicates() {
        let branch_id = Uuid::new_v4();
        let department_id = Uuid::new_v4();
        let super_admin = Uuid::new_v4();
        // One person both heads the branch and deputizes the department.
        let double_manager = Uuid::new_v4();

        let authority = OrgAuthority::new(
            [super_admin],
            [(branch_id, double_manager)],
            [(department_id, double_manager)],
        );

        let mut employee = fixtures::employee(dec!(3000), dec!(100));
        employee.branch_id = Some(branch_id);
        employee.department_id = Some(department_id);

        let approvers = authority.required_approvers(&employee);
        assert_eq!(approvers.len(), 2);
        assert!(approvers.contains(&super_admin));
        assert!(approvers.contains(&double_manager));
    }

    #[test]
    fn test_unplaced_employee_needs_only_super_admins() {
        let super_admin = Uuid::new_v4();
        let authority = OrgAuthority::new([super_admin], [(Uuid::new_v4(), Uuid::new_v4())], []);

        let employee = fixtures::employee(dec!(3000), dec!(100));

        let approvers = authority.required_approvers(&employee);
        assert_eq!(approvers.len(), 1);
        assert!(approvers.contains(&super_admin));
    }
}
