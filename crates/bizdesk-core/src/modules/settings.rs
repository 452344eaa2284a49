//! Settings: the staff directory and per-module permissions.

use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

use crate::model::{
    EmployeeStatus, Entity, Record, RecordId, StaffMember, StaffPatch, StaffRole,
};
use crate::query::{Query, QueryField};
use crate::session::SessionProvider;
use crate::store::RecordStore;
use crate::view_model::{EntityViewModel, UpdateMode};

/// Modules a staff member can be granted, as `(key, label, description)`.
pub const AVAILABLE_MODULES: &[(&str, &str, &str)] = &[
    ("dashboard", "Dashboard Overview", "View main dashboard and KPIs"),
    ("hr", "HR Management", "Manage employees, payroll, and PTO"),
    ("projects", "Project Management", "Create and manage projects and tasks"),
    ("support", "Customer Support", "Handle customer tickets and chat"),
    ("communication", "Team Communication", "Access team chat and channels"),
    ("website", "Website Builder", "Create and edit company websites"),
    ("marketing", "Marketing Hub", "Manage campaigns and marketing materials"),
    ("finance", "Finance & Accounting", "View financial data and reports"),
    ("sales", "Sales & CRM", "Manage sales pipeline and customers"),
    ("legal", "Legal & Compliance", "Access legal documents and contracts"),
    ("analytics", "Analytics", "View business analytics and reports"),
    ("mobile", "Mobile App Builder", "Create mobile applications"),
    ("settings", "Settings & Admin", "Admin portal and system settings"),
];

#[must_use]
pub fn is_known_module(key: &str) -> bool {
    AVAILABLE_MODULES.iter().any(|(module, _, _)| *module == key)
}

/// Staff records, visible only to admins. Updates apply locally without a
/// reload.
#[derive(Debug, Clone)]
pub struct StaffDirectory {
    staff: EntityViewModel<StaffMember>,
    admin: Arc<AtomicBool>,
}

impl StaffDirectory {
    pub fn new(store: Arc<dyn RecordStore>, session: Arc<dyn SessionProvider>) -> Self {
        Self {
            staff: EntityViewModel::new(store, session).with_update_mode(UpdateMode::Optimistic),
            admin: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub const fn staff(&self) -> &EntityViewModel<StaffMember> {
        &self.staff
    }

    /// Result of the last admin check.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.admin.load(Ordering::Acquire)
    }

    /// Re-check admin status and load staff for admins. Non-admins see an
    /// empty directory. Returns whether the directory was loaded.
    pub async fn load(&self) -> bool {
        let admin = self.check_admin().await;
        self.admin.store(admin, Ordering::Release);
        if !admin {
            self.staff.clear();
            return false;
        }
        self.staff.load().await
    }

    /// Whether the signed-in identity has an admin staff record under its
    /// own account.
    async fn check_admin(&self) -> bool {
        let Some(identity) = self.staff.session().current_identity() else {
            return false;
        };
        let query = Query::owned_by(StaffMember::KIND, identity.id)
            .where_eq(QueryField::Email, identity.email.as_str())
            .limit(1);
        match self.staff.store().list(&query).await {
            Ok(rows) => rows
                .into_iter()
                .next()
                .and_then(|row| row.decode::<StaffMember>().ok())
                .is_some_and(|record| record.fields.role == StaffRole::Admin),
            Err(err) => {
                warn!(error = %err, "admin check failed");
                false
            }
        }
    }

    /// Add an active staff member at the top of the directory.
    pub async fn add_staff(&self, mut member: StaffMember) -> Option<Record<StaffMember>> {
        member.status = EmployeeStatus::Active;
        let id = RecordId::new(format!("emp_{}", Utc::now().timestamp_millis()));
        self.staff.prepend(Some(id), member).await
    }

    pub async fn update_staff(&self, id: &RecordId, patch: StaffPatch) -> bool {
        self.staff.update(id, patch).await
    }

    pub async fn remove_staff(&self, id: &RecordId) -> bool {
        self.staff.delete(id).await
    }

    /// Grant `module` if the member lacks it, revoke it otherwise.
    pub async fn toggle_permission(&self, id: &RecordId, module: &str) -> bool {
        if !is_known_module(module) {
            debug!(module, "unknown module");
            return false;
        }
        let Some(member) = self.staff.find(id) else {
            return false;
        };
        let mut permissions = member.fields.permissions;
        if let Some(pos) = permissions.iter().position(|p| p == module) {
            permissions.remove(pos);
        } else {
            permissions.push(module.to_string());
        }
        self.staff
            .update(
                id,
                StaffPatch {
                    permissions: Some(permissions),
                    ..StaffPatch::default()
                },
            )
            .await
    }
}
