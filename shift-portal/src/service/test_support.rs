//! Fixtures shared by the service tests

use chrono::{NaiveDate, NaiveTime};
use shared::models::{
    AvailableShiftSlot, Employee, EmployeeBranchAssignment, ScheduledShift, Week,
};

use crate::db::{MemoryShiftStore, ShiftStore};

pub const BUSINESS_ID: i64 = 10;
pub const EMPLOYEE_ID: i64 = 1;
pub const INACTIVE_EMPLOYEE_ID: i64 = 2;
pub const UNASSIGNED_EMPLOYEE_ID: i64 = 3;

pub const BRANCH_A: i64 = 100;
pub const BRANCH_B: i64 = 200;

/// 2026-10-19T12:00:00Z, Monday of the fixture week
pub const NOW: i64 = 1_792_411_200_000;

/// Slot ids the fixture employee is offered, in display order
pub const OFFERED: [i64; 4] = [501, 502, 503, 504];
/// Branch B, day 2, morning
pub const OTHER_BRANCH_SLOT: i64 = 505;
/// Branch A, Saturday, outside the employee's days
pub const OFF_DAY_SLOT: i64 = 506;

pub fn week() -> Week {
    Week::starting(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()).unwrap()
}

pub fn time(h: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, 0, 0).unwrap()
}

pub fn slot(id: i64, branch_id: i64, day_of_week: i16, shift_type: &str, start: u32) -> AvailableShiftSlot {
    AvailableShiftSlot {
        id,
        business_id: BUSINESS_ID,
        branch_id,
        week_start_date: week().start,
        week_end_date: week().end,
        day_of_week,
        shift_type: shift_type.to_string(),
        start_time: time(start),
        end_time: time((start + 8) % 24),
    }
}

pub fn assignment(id: i64, employee_id: i64, branch_id: i64, shift_types: &[&str], days: &[i16]) -> EmployeeBranchAssignment {
    EmployeeBranchAssignment {
        id,
        employee_id,
        branch_id,
        branch_name: format!("Branch {branch_id}"),
        role_name: "barista".to_string(),
        shift_types: shift_types.iter().map(|s| s.to_string()).collect(),
        available_days: days.to_vec(),
        is_active: true,
    }
}

fn employee(id: i64, name: &str, is_active: bool) -> Employee {
    Employee {
        id,
        business_id: BUSINESS_ID,
        name: name.to_string(),
        is_active,
        shift_quota: None,
    }
}

/// One active employee assigned to branch A (morning + evening, Mon..Fri),
/// one inactive and one unassigned employee, and six open slots.
pub async fn seeded_store() -> MemoryShiftStore {
    let store = MemoryShiftStore::new();
    store.add_employee(employee(EMPLOYEE_ID, "Ana", true)).await;
    store.add_employee(employee(INACTIVE_EMPLOYEE_ID, "Ben", false)).await;
    store.add_employee(employee(UNASSIGNED_EMPLOYEE_ID, "Caro", true)).await;

    store
        .add_assignment(assignment(
            1,
            EMPLOYEE_ID,
            BRANCH_A,
            &["morning", "evening"],
            &[1, 2, 3, 4, 5],
        ))
        .await;
    store
        .add_assignment(assignment(2, INACTIVE_EMPLOYEE_ID, BRANCH_A, &["morning"], &[1]))
        .await;

    for s in [
        slot(504, BRANCH_A, 3, "morning", 8),
        slot(OTHER_BRANCH_SLOT, BRANCH_B, 2, "morning", 8),
        slot(502, BRANCH_A, 2, "morning", 8),
        slot(OFF_DAY_SLOT, BRANCH_A, 6, "morning", 8),
        slot(503, BRANCH_A, 2, "evening", 16),
        slot(501, BRANCH_A, 1, "morning", 8),
    ] {
        store.add_slot(s).await;
    }
    store
}

/// Mark an existing employee inactive
pub async fn deactivate(store: &MemoryShiftStore, employee_id: i64) {
    let mut employee = store
        .find_employee(employee_id)
        .await
        .unwrap()
        .unwrap();
    employee.is_active = false;
    store.add_employee(employee).await;
}

/// Publish one scheduled shift for the employee on the given day
pub async fn publish_shift(store: &MemoryShiftStore, employee_id: i64, day_of_week: i16) {
    store
        .add_scheduled_shift(ScheduledShift {
            id: 900 + i64::from(day_of_week),
            business_id: BUSINESS_ID,
            employee_id,
            branch_id: BRANCH_A,
            shift_date: week().date_of(day_of_week).unwrap(),
            shift_type: "morning".to_string(),
            start_time: time(8),
            end_time: time(16),
            role_name: Some("barista".to_string()),
        })
        .await;
}
