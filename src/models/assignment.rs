//! Employee salary assignments and their append-only history.
//!
//! Assignments are immutable dated snapshots. A newer assignment supersedes
//! an older one from its effective date onwards; nothing is ever edited in
//! place, so recomputing a past period always sees the same snapshot.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// One component entry in an assignment, optionally overriding the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentLine {
    /// The catalogue component code.
    pub code: String,
    /// Per-employee value overriding the catalogue default.
    #[serde(default)]
    pub value: Option<Decimal>,
    /// Per-employee formula overriding the catalogue formula.
    #[serde(default)]
    pub formula: Option<String>,
}

/// A dated snapshot of an employee's salary structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSalaryAssignment {
    /// The employee this assignment belongs to.
    pub employee_id: String,
    /// The first date on which this assignment applies.
    pub effective_from: NaiveDate,
    /// The components making up the salary, in display order.
    pub lines: Vec<AssignmentLine>,
}

/// Lifecycle state of an assignment relative to a given date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    /// Effective date is still in the future.
    Draft,
    /// The assignment in force on the date.
    Active,
    /// A later assignment has taken effect.
    Superseded,
}

/// Append-only sequence of an employee's assignments, ordered by effective date.
///
/// # Example
///
/// ```
/// use tax_engine::models::{AssignmentStatus, EmployeeSalaryAssignment, SalaryAssignmentHistory};
/// use chrono::NaiveDate;
///
/// let date = |m, d| NaiveDate::from_ymd_opt(2024, m, d).unwrap();
/// let mut history = SalaryAssignmentHistory::new("emp_001");
/// history
///     .supersede(EmployeeSalaryAssignment {
///         employee_id: "emp_001".to_string(),
///         effective_from: date(4, 1),
///         lines: vec![],
///     })
///     .unwrap();
/// history
///     .supersede(EmployeeSalaryAssignment {
///         employee_id: "emp_001".to_string(),
///         effective_from: date(10, 1),
///         lines: vec![],
///     })
///     .unwrap();
///
/// assert_eq!(history.effective_on(date(6, 15)).unwrap().effective_from, date(4, 1));
/// assert_eq!(history.status_on(0, date(11, 1)), Some(AssignmentStatus::Superseded));
/// assert_eq!(history.status_on(1, date(6, 15)), Some(AssignmentStatus::Draft));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "SalaryAssignmentHistoryRecord",
    into = "SalaryAssignmentHistoryRecord"
)]
pub struct SalaryAssignmentHistory {
    employee_id: String,
    assignments: Vec<EmployeeSalaryAssignment>,
}

/// Wire form of [`SalaryAssignmentHistory`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryAssignmentHistoryRecord {
    /// The employee the history belongs to.
    pub employee_id: String,
    /// Assignments in any order.
    pub assignments: Vec<EmployeeSalaryAssignment>,
}

impl SalaryAssignmentHistory {
    /// Creates an empty history for an employee.
    pub fn new(employee_id: impl Into<String>) -> Self {
        Self {
            employee_id: employee_id.into(),
            assignments: Vec::new(),
        }
    }

    /// Builds a history from assignments supplied in any order.
    pub fn from_assignments(
        employee_id: impl Into<String>,
        mut assignments: Vec<EmployeeSalaryAssignment>,
    ) -> EngineResult<Self> {
        assignments.sort_by(|a, b| a.effective_from.cmp(&b.effective_from));
        let mut history = Self::new(employee_id);
        for assignment in assignments {
            history.supersede(assignment)?;
        }
        Ok(history)
    }

    /// Appends a new assignment that supersedes the latest one.
    ///
    /// The new effective date must be strictly after every existing one.
    pub fn supersede(&mut self, assignment: EmployeeSalaryAssignment) -> EngineResult<()> {
        if assignment.employee_id != self.employee_id {
            return Err(EngineError::invalid_input(
                "assignments.employee_id",
                format!(
                    "assignment for '{}' cannot join the history of '{}'",
                    assignment.employee_id, self.employee_id
                ),
            ));
        }
        if let Some(latest) = self.assignments.last() {
            if assignment.effective_from <= latest.effective_from {
                return Err(EngineError::invalid_input(
                    "assignments.effective_from",
                    format!(
                        "{} does not follow the latest effective date {}",
                        assignment.effective_from, latest.effective_from
                    ),
                ));
            }
        }
        self.assignments.push(assignment);
        Ok(())
    }

    /// Returns the employee the history belongs to.
    pub fn employee_id(&self) -> &str {
        &self.employee_id
    }

    /// Returns all assignments, oldest first.
    pub fn assignments(&self) -> &[EmployeeSalaryAssignment] {
        &self.assignments
    }

    /// Returns the assignment in force on `date`, if any.
    pub fn effective_on(&self, date: NaiveDate) -> Option<&EmployeeSalaryAssignment> {
        self.assignments.iter().rfind(|a| a.effective_from <= date)
    }

    /// Returns the status of the assignment at `index` as seen on `date`.
    pub fn status_on(&self, index: usize, date: NaiveDate) -> Option<AssignmentStatus> {
        let assignment = self.assignments.get(index)?;
        if assignment.effective_from > date {
            return Some(AssignmentStatus::Draft);
        }
        let superseded = self
            .assignments
            .get(index + 1)
            .is_some_and(|next| next.effective_from <= date);
        Some(if superseded {
            AssignmentStatus::Superseded
        } else {
            AssignmentStatus::Active
        })
    }
}

impl TryFrom<SalaryAssignmentHistoryRecord> for SalaryAssignmentHistory {
    type Error = EngineError;

    fn try_from(record: SalaryAssignmentHistoryRecord) -> EngineResult<Self> {
        Self::from_assignments(record.employee_id, record.assignments)
    }
}

impl From<SalaryAssignmentHistory> for SalaryAssignmentHistoryRecord {
    fn from(history: SalaryAssignmentHistory) -> Self {
        Self {
            employee_id: history.employee_id,
            assignments: history.assignments,
        }
    }
}
