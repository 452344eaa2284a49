//! `bz stats`: dashboard summary across modules.

use bizdesk_core::aggregate::{HrSummary, MarketingSummary, ProjectSummary, SupportSummary};
use bizdesk_core::modules::{HrDesk, MarketingHub, ProjectBoard, SupportDesk};
use chrono::{NaiveDate, Utc};
use clap::Args;
use serde::Serialize;
use std::io::Write;

use super::{Workspace, ensure_loaded};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Day used for "resolved today" and overdue checks (YYYY-MM-DD, UTC).
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
struct Dashboard {
    date: NaiveDate,
    support: SupportSummary,
    hr: HrSummary,
    projects: ProjectSummary,
    marketing: MarketingSummary,
}

/// Execute `bz stats`.
pub async fn run_stats(
    args: &StatsArgs,
    workspace: &Workspace,
    output: OutputMode,
) -> anyhow::Result<()> {
    let today = args.date.unwrap_or_else(|| Utc::now().date_naive());
    let (store, session) = (workspace.store(), workspace.session());

    let support = SupportDesk::new(store.clone(), session.clone());
    let hr = HrDesk::new(store.clone(), session.clone());
    let projects = ProjectBoard::new(store.clone(), session.clone());
    let marketing = MarketingHub::new(store, session);

    let (s, h, p, m) = tokio::join!(support.load(), hr.load(), projects.load(), marketing.load());
    ensure_loaded(output, s && h && p && m, "dashboard records")?;

    let dashboard = Dashboard {
        date: today,
        support: support.summary(today),
        hr: hr.summary(),
        projects: projects.summary(today),
        marketing: marketing.summary(),
    };

    render_mode(
        output,
        &dashboard,
        |d, w| {
            writeln!(w, "support.open\t{}", d.support.open)?;
            writeln!(w, "support.in_progress\t{}", d.support.in_progress)?;
            writeln!(w, "support.resolved_today\t{}", d.support.resolved_today)?;
            writeln!(w, "hr.headcount\t{}", d.hr.headcount)?;
            writeln!(w, "hr.active_employees\t{}", d.hr.active_employees)?;
            writeln!(w, "hr.pending_pto\t{}", d.hr.pending_pto)?;
            writeln!(w, "hr.total_payroll\t{}", d.hr.total_payroll)?;
            writeln!(w, "projects.in_progress\t{}", d.projects.in_progress)?;
            writeln!(w, "projects.total_tasks\t{}", d.projects.total_tasks)?;
            writeln!(w, "projects.overdue_tasks\t{}", d.projects.overdue_tasks)?;
            writeln!(w, "marketing.active_campaigns\t{}", d.marketing.active_campaigns)?;
            writeln!(w, "marketing.total_contacts\t{}", d.marketing.total_contacts)?;
            writeln!(w, "marketing.avg_open_rate\t{}", d.marketing.avg_open_rate)?;
            writeln!(w, "marketing.avg_click_rate\t{}", d.marketing.avg_click_rate)
        },
        |d, w| {
            writeln!(w, "Dashboard for {}", d.date)?;
            writeln!(w)?;
            pretty_section(w, "Support")?;
            pretty_kv(w, "open", d.support.open.to_string())?;
            pretty_kv(w, "in progress", d.support.in_progress.to_string())?;
            pretty_kv(w, "resolved", d.support.resolved_today.to_string())?;
            writeln!(w)?;
            pretty_section(w, "HR")?;
            pretty_kv(w, "headcount", format!("{} ({} active)", d.hr.headcount, d.hr.active_employees))?;
            pretty_kv(w, "pending pto", d.hr.pending_pto.to_string())?;
            pretty_kv(w, "payroll", format!("{:.0}", d.hr.total_payroll))?;
            pretty_kv(w, "tax estimate", format!("{:.0}", d.hr.tax_estimate))?;
            pretty_kv(w, "net payroll", format!("{:.0}", d.hr.net_payroll))?;
            writeln!(w)?;
            pretty_section(w, "Projects")?;
            pretty_kv(w, "in progress", d.projects.in_progress.to_string())?;
            pretty_kv(
                w,
                "tasks",
                format!("{} ({} overdue)", d.projects.total_tasks, d.projects.overdue_tasks),
            )?;
            writeln!(w)?;
            pretty_section(w, "Marketing")?;
            pretty_kv(w, "active", d.marketing.active_campaigns.to_string())?;
            pretty_kv(w, "contacts", d.marketing.total_contacts.to_string())?;
            pretty_kv(w, "open rate", format!("{:.0}%", d.marketing.avg_open_rate))?;
            pretty_kv(w, "click rate", format!("{:.0}%", d.marketing.avg_click_rate))
        },
    )
}
