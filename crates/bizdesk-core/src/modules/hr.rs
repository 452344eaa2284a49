//! HR: employees, PTO requests, and payroll entries.

use std::sync::Arc;
use tracing::debug;

use crate::aggregate::{HrSummary, hr_summary};
use crate::model::{
    Employee, EmployeePatch, PayrollEntry, PayrollPatch, PayrollStatus, PtoPatch, PtoRequest,
    PtoStatus, Record, RecordId,
};
use crate::session::SessionProvider;
use crate::store::RecordStore;
use crate::view_model::EntityViewModel;

#[derive(Debug, Clone)]
pub struct HrDesk {
    employees: EntityViewModel<Employee>,
    pto: EntityViewModel<PtoRequest>,
    payroll: EntityViewModel<PayrollEntry>,
}

impl HrDesk {
    pub fn new(store: Arc<dyn RecordStore>, session: Arc<dyn SessionProvider>) -> Self {
        Self {
            employees: EntityViewModel::new(Arc::clone(&store), Arc::clone(&session)),
            pto: EntityViewModel::new(Arc::clone(&store), Arc::clone(&session)),
            payroll: EntityViewModel::new(store, session),
        }
    }

    #[must_use]
    pub const fn employees(&self) -> &EntityViewModel<Employee> {
        &self.employees
    }

    #[must_use]
    pub const fn pto(&self) -> &EntityViewModel<PtoRequest> {
        &self.pto
    }

    #[must_use]
    pub const fn payroll(&self) -> &EntityViewModel<PayrollEntry> {
        &self.payroll
    }

    /// Load all three collections. Each load fails independently.
    pub async fn load(&self) -> bool {
        let employees = self.employees.load().await;
        let pto = self.pto.load().await;
        let payroll = self.payroll.load().await;
        employees && pto && payroll
    }

    pub async fn add_employee(&self, employee: Employee) -> Option<Record<Employee>> {
        self.employees.create(employee).await
    }

    pub async fn update_employee(&self, id: &RecordId, patch: EmployeePatch) -> bool {
        self.employees.update(id, patch).await
    }

    pub async fn remove_employee(&self, id: &RecordId) -> bool {
        self.employees.delete(id).await
    }

    /// File a PTO request; it always starts pending.
    pub async fn request_pto(&self, mut request: PtoRequest) -> Option<Record<PtoRequest>> {
        request.status = PtoStatus::Pending;
        self.pto.create(request).await
    }

    /// Approve or reject a PTO request. `Pending` is not a decision.
    pub async fn decide_pto(&self, id: &RecordId, decision: PtoStatus) -> bool {
        if decision == PtoStatus::Pending {
            debug!(%id, "pending is not a pto decision");
            return false;
        }
        self.pto
            .update(
                id,
                PtoPatch {
                    status: Some(decision),
                    ..PtoPatch::default()
                },
            )
            .await
    }

    /// Advance a payroll entry's status.
    pub async fn set_payroll_status(&self, id: &RecordId, status: PayrollStatus) -> bool {
        self.payroll
            .update(
                id,
                PayrollPatch {
                    status: Some(status),
                    ..PayrollPatch::default()
                },
            )
            .await
    }

    /// Employees whose name, email, or department contains `term`.
    #[must_use]
    pub fn filtered_employees(&self, term: &str) -> Vec<Record<Employee>> {
        self.employees.search(term)
    }

    #[must_use]
    pub fn summary(&self) -> HrSummary {
        hr_summary(&self.employees.snapshot(), &self.pto.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EmployeeStatus, PtoKind};
    use crate::session::{Identity, LocalSession};
    use crate::store::memory::{MemoryStore, StoreOp};
    use chrono::NaiveDate;

    fn desk() -> (Arc<MemoryStore>, HrDesk) {
        let store = Arc::new(MemoryStore::new());
        let session = Arc::new(LocalSession::signed_in(Identity::new("u1", "hr@example.com")));
        (store.clone(), HrDesk::new(store, session))
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).expect("date")
    }

    fn employee(name: &str, department: &str, salary: f64) -> Employee {
        Employee {
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            position: "Engineer".into(),
            department: department.into(),
            salary,
            hire_date: day(1),
            status: EmployeeStatus::Active,
            avatar: None,
        }
    }

    #[tokio::test]
    async fn search_spans_name_email_and_department() {
        let (_store, desk) = desk();
        desk.add_employee(employee("Morgan", "Finance", 50_000.0)).await.expect("a");
        desk.add_employee(employee("Riley", "Engineering", 70_000.0)).await.expect("b");

        assert_eq!(desk.filtered_employees("FIN").len(), 1);
        assert_eq!(desk.filtered_employees("riley@").len(), 1);
        assert_eq!(desk.filtered_employees("").len(), 2);
    }

    #[tokio::test]
    async fn pto_decisions_exclude_pending() {
        let (store, desk) = desk();
        let request = desk
            .request_pto(PtoRequest {
                employee_id: RecordId::new("emp-1"),
                employee_name: "Morgan".into(),
                kind: PtoKind::Vacation,
                start_date: day(4),
                end_date: day(8),
                days: 5,
                status: PtoStatus::Approved,
                reason: "trip".into(),
            })
            .await
            .expect("filed");
        assert_eq!(request.fields.status, PtoStatus::Pending);
        assert_eq!(desk.summary().pending_pto, 1);

        assert!(!desk.decide_pto(request.id(), PtoStatus::Pending).await);
        assert_eq!(store.calls(StoreOp::Update), 0);

        assert!(desk.decide_pto(request.id(), PtoStatus::Approved).await);
        assert_eq!(desk.summary().pending_pto, 0);
    }

    #[tokio::test]
    async fn summary_tracks_payroll_totals() {
        let (_store, desk) = desk();
        desk.add_employee(employee("Morgan", "Finance", 40_000.0)).await.expect("a");
        let riley = desk
            .add_employee(employee("Riley", "Engineering", 60_000.0))
            .await
            .expect("b");
        assert!(
            desk.update_employee(
                riley.id(),
                EmployeePatch {
                    status: Some(EmployeeStatus::Inactive),
                    ..EmployeePatch::default()
                }
            )
            .await
        );

        let summary = desk.summary();
        assert_eq!(summary.headcount, 2);
        assert_eq!(summary.active_employees, 1);
        assert!((summary.total_payroll - 100_000.0).abs() < 1e-9);
        assert!((summary.tax_estimate - 25_000.0).abs() < 1e-9);
        assert!((summary.net_payroll - 75_000.0).abs() < 1e-9);
    }
}
