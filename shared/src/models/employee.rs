//! Employee Model

use serde::{Deserialize, Serialize};

/// Employee as seen by the shift portal (read-only, owned by admin screens)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Employee {
    pub id: i64,
    pub business_id: i64,
    pub name: String,
    pub is_active: bool,
    /// Max shift choices per week; falls back to the service default when unset
    pub shift_quota: Option<i32>,
}

impl Employee {
    /// Effective weekly quota
    pub fn quota_or(&self, default_quota: i32) -> i32 {
        self.shift_quota.filter(|q| *q > 0).unwrap_or(default_quota)
    }
}

/// Branch assignment: which branch, role, shift types and days an employee may work
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct EmployeeBranchAssignment {
    pub id: i64,
    pub employee_id: i64,
    pub branch_id: i64,
    pub branch_name: String,
    pub role_name: String,
    /// e.g. ["morning", "evening"]
    pub shift_types: Vec<String>,
    /// 0 = Sunday .. 6 = Saturday
    pub available_days: Vec<i16>,
    pub is_active: bool,
}

impl EmployeeBranchAssignment {
    /// Whether this assignment allows working `shift_type` on `day_of_week` at `branch_id`
    pub fn allows(&self, branch_id: i64, shift_type: &str, day_of_week: i16) -> bool {
        self.is_active
            && self.branch_id == branch_id
            && self.shift_types.iter().any(|t| t == shift_type)
            && self.available_days.contains(&day_of_week)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_fallback() {
        let mut employee = Employee {
            id: 1,
            business_id: 10,
            name: "Dana".into(),
            is_active: true,
            shift_quota: None,
        };
        assert_eq!(employee.quota_or(3), 3);
        employee.shift_quota = Some(5);
        assert_eq!(employee.quota_or(3), 5);
        employee.shift_quota = Some(0);
        assert_eq!(employee.quota_or(3), 3);
    }

    #[test]
    fn test_assignment_allows() {
        let assignment = EmployeeBranchAssignment {
            id: 1,
            employee_id: 1,
            branch_id: 100,
            branch_name: "Center".into(),
            role_name: "cashier".into(),
            shift_types: vec!["morning".into()],
            available_days: vec![0, 2],
            is_active: true,
        };
        assert!(assignment.allows(100, "morning", 2));
        assert!(!assignment.allows(200, "morning", 2));
        assert!(!assignment.allows(100, "evening", 2));
        assert!(!assignment.allows(100, "morning", 3));

        let inactive = EmployeeBranchAssignment {
            is_active: false,
            ..assignment
        };
        assert!(!inactive.allows(100, "morning", 2));
    }
}
