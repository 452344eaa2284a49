//! Derived counts, sums, and averages, computed on read.
//!
//! Everything here is a pure function of its inputs. Nothing is cached;
//! callers recompute after every load.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::{
    Campaign, CampaignStatus, Contact, Employee, EmployeeStatus, Project, ProjectStatus, PtoRequest,
    PtoStatus, Record, Task, TaskStatus, Ticket, TicketStatus,
};

/// Number of items satisfying `pred`.
pub fn count<T>(items: &[T], pred: impl Fn(&T) -> bool) -> usize {
    items.iter().filter(|item| pred(item)).count()
}

/// Number of items satisfying both predicates.
pub fn count_both<T>(items: &[T], p: impl Fn(&T) -> bool, q: impl Fn(&T) -> bool) -> usize {
    items.iter().filter(|item| p(item) && q(item)).count()
}

/// Sum of a numeric field.
pub fn sum<T>(items: &[T], field: impl Fn(&T) -> f64) -> f64 {
    items.iter().map(field).sum()
}

/// Arithmetic mean of a numeric field; 0 for an empty slice.
pub fn average<T>(items: &[T], field: impl Fn(&T) -> f64) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let len = items.len() as f64;
    sum(items, field) / len
}

/// Item counts per key.
pub fn count_by<T, K: Ord>(items: &[T], key: impl Fn(&T) -> K) -> BTreeMap<K, usize> {
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(key(item)).or_insert(0) += 1;
    }
    counts
}

/// Whether the record was updated on `day` (UTC). Records never updated
/// do not count, whatever their creation date.
#[must_use]
pub fn updated_on<E>(record: &Record<E>, day: NaiveDate) -> bool {
    record
        .meta
        .updated_at
        .is_some_and(|updated| updated.date_naive() == day)
}

// ---------------------------------------------------------------------------
// Module summaries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SupportSummary {
    pub open: usize,
    pub in_progress: usize,
    pub resolved_today: usize,
}

#[must_use]
pub fn support_summary(tickets: &[Record<Ticket>], today: NaiveDate) -> SupportSummary {
    SupportSummary {
        open: count(tickets, |t| t.fields.status == TicketStatus::Open),
        in_progress: count(tickets, |t| t.fields.status == TicketStatus::InProgress),
        resolved_today: count_both(
            tickets,
            |t| t.fields.status == TicketStatus::Resolved,
            |t| updated_on(t, today),
        ),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct HrSummary {
    pub headcount: usize,
    pub active_employees: usize,
    pub pending_pto: usize,
    pub total_payroll: f64,
    pub tax_estimate: f64,
    pub net_payroll: f64,
}

/// Flat tax rate applied to the payroll estimate.
pub const PAYROLL_TAX_RATE: f64 = 0.25;

#[must_use]
pub fn hr_summary(employees: &[Record<Employee>], pto: &[Record<PtoRequest>]) -> HrSummary {
    let total_payroll = sum(employees, |e| e.fields.salary);
    HrSummary {
        headcount: employees.len(),
        active_employees: count(employees, |e| e.fields.status == EmployeeStatus::Active),
        pending_pto: count(pto, |p| p.fields.status == PtoStatus::Pending),
        total_payroll,
        tax_estimate: (total_payroll * PAYROLL_TAX_RATE).round(),
        net_payroll: (total_payroll * (1.0 - PAYROLL_TAX_RATE)).round(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ProjectSummary {
    pub in_progress: usize,
    pub total_tasks: usize,
    pub overdue_tasks: usize,
}

#[must_use]
pub fn project_summary(
    projects: &[Record<Project>],
    tasks: &[Record<Task>],
    today: NaiveDate,
) -> ProjectSummary {
    ProjectSummary {
        in_progress: count(projects, |p| p.fields.status == ProjectStatus::InProgress),
        total_tasks: tasks.len(),
        overdue_tasks: count_both(
            tasks,
            |t| t.fields.due_date < today,
            |t| t.fields.status != TaskStatus::Done,
        ),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MarketingSummary {
    pub active_campaigns: usize,
    pub total_contacts: usize,
    pub avg_open_rate: f64,
    pub avg_click_rate: f64,
}

#[must_use]
pub fn marketing_summary(
    campaigns: &[Record<Campaign>],
    contacts: &[Record<Contact>],
) -> MarketingSummary {
    MarketingSummary {
        active_campaigns: count(campaigns, |c| c.fields.status == CampaignStatus::Active),
        total_contacts: contacts.len(),
        avg_open_rate: average(campaigns, |c| c.fields.open_rate).round(),
        avg_click_rate: average(campaigns, |c| c.fields.click_rate).round(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OwnerId, RecordId, RecordMeta, TicketPriority};
    use chrono::{DateTime, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).expect("ts")
    }

    fn ticket(id: &str, status: TicketStatus, updated: Option<i64>) -> Record<Ticket> {
        Record {
            meta: RecordMeta {
                id: RecordId::new(id),
                owner: OwnerId::new("u1"),
                created_at: at(0),
                updated_at: updated.map(at),
            },
            fields: Ticket {
                title: id.into(),
                description: String::new(),
                status,
                priority: TicketPriority::Medium,
                customer_name: String::new(),
                customer_email: String::new(),
                assigned_to: String::new(),
                category: String::new(),
                satisfaction_rating: None,
            },
        }
    }

    #[test]
    fn empty_inputs_yield_zero() {
        let none: [f64; 0] = [];
        assert_eq!(count(&none, |_| true), 0);
        assert!(average(&none, |v| *v).abs() < f64::EPSILON);
        assert!(sum(&none, |v| *v).abs() < f64::EPSILON);
        assert!(count_by(&none, |v| v.to_bits()).is_empty());
    }

    #[test]
    fn average_is_the_mean() {
        let values = [2.0, 4.0, 9.0];
        assert!((average(&values, |v| *v) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn count_by_groups_keys() {
        let words = ["a", "bb", "cc", "d"];
        let counts = count_by(&words, |w| w.len());
        assert_eq!(counts.get(&1), Some(&2));
        assert_eq!(counts.get(&2), Some(&2));
    }

    #[test]
    fn never_updated_records_are_not_updated_today() {
        let created_day = at(0).date_naive();
        let fresh = ticket("f", TicketStatus::Resolved, None);
        assert!(!updated_on(&fresh, created_day));
        assert_eq!(support_summary(&[fresh], created_day).resolved_today, 0);
    }

    #[test]
    fn support_summary_counts_resolved_today_by_update_date() {
        let day = at(86_400 * 10).date_naive();
        let tickets = vec![
            ticket("a", TicketStatus::Open, None),
            ticket("b", TicketStatus::InProgress, None),
            ticket("c", TicketStatus::Resolved, Some(86_400 * 10 + 60)),
            ticket("d", TicketStatus::Resolved, Some(86_400 * 9)),
            ticket("e", TicketStatus::Closed, Some(86_400 * 10)),
        ];
        assert_eq!(
            support_summary(&tickets, day),
            SupportSummary {
                open: 1,
                in_progress: 1,
                resolved_today: 1,
            }
        );
    }

    #[test]
    fn payroll_split_rounds() {
        let employees: Vec<Record<Employee>> = [1001.0, 2000.0]
            .iter()
            .enumerate()
            .map(|(i, salary)| Record {
                meta: RecordMeta {
                    id: RecordId::new(format!("emp-{i}")),
                    owner: OwnerId::new("u1"),
                    created_at: at(0),
                    updated_at: None,
                },
                fields: Employee {
                    name: format!("E{i}"),
                    email: String::new(),
                    position: String::new(),
                    department: String::new(),
                    salary: *salary,
                    hire_date: at(0).date_naive(),
                    status: EmployeeStatus::Active,
                    avatar: None,
                },
            })
            .collect();
        let summary = hr_summary(&employees, &[]);
        assert_eq!(summary.headcount, 2);
        assert!((summary.total_payroll - 3001.0).abs() < 1e-9);
        assert!((summary.tax_estimate - 750.0).abs() < 1e-9);
        assert!((summary.net_payroll - 2251.0).abs() < 1e-9);
    }
}
