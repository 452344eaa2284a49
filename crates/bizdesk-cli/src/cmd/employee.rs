//! `bz employee`: the HR employee roster.

use bizdesk_core::model::{Employee, EmployeeStatus, Record, RecordId};
use bizdesk_core::modules::HrDesk;
use chrono::{NaiveDate, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::io::{self, Write};
use tracing::info;

use super::{Workspace, ensure_loaded, parse_value, require_effect, require_found, require_record};
use crate::output::{OutputMode, pretty_section, render, render_mode};

#[derive(Subcommand, Debug)]
pub enum EmployeeCommand {
    /// Add an employee to the roster.
    Add(AddArgs),
    /// List employees, newest hire record first.
    List(ListArgs),
    /// Remove an employee.
    Remove(RemoveArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long, default_value = "")]
    pub position: String,

    #[arg(long, default_value = "")]
    pub department: String,

    /// Annual salary.
    #[arg(long, default_value_t = 0.0)]
    pub salary: f64,

    /// Hire date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub hire_date: Option<NaiveDate>,

    /// active or inactive.
    #[arg(long, default_value = "active")]
    pub status: String,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Case-insensitive match on name, email, and department.
    #[arg(long, default_value = "")]
    pub search: String,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    pub id: String,
}

#[derive(Debug, Serialize)]
struct Removed<'a> {
    removed: &'a RecordId,
}

fn employee_row(w: &mut dyn Write, e: &Record<Employee>) -> io::Result<()> {
    writeln!(
        w,
        "{}\t{}\t{}\t{}\t{}",
        e.id(),
        e.fields.name,
        e.fields.department,
        e.fields.status,
        e.fields.salary
    )
}

/// Dispatch a `bz employee` subcommand.
pub async fn run_employee(
    command: &EmployeeCommand,
    workspace: &Workspace,
    output: OutputMode,
) -> anyhow::Result<()> {
    let hr = HrDesk::new(workspace.store(), workspace.session());
    ensure_loaded(output, hr.load().await, "employees")?;

    match command {
        EmployeeCommand::Add(args) => {
            let status: EmployeeStatus = parse_value(output, "status", &args.status)?;
            let employee = Employee {
                name: args.name.clone(),
                email: args.email.clone(),
                position: args.position.clone(),
                department: args.department.clone(),
                salary: args.salary,
                hire_date: args.hire_date.unwrap_or_else(|| Utc::now().date_naive()),
                status,
                avatar: None,
            };
            let added = require_record(output, hr.add_employee(employee).await, "employee add")?;
            info!(id = %added.id(), "employee added");
            render(output, &added, |e, w| employee_row(w, e))
        }
        EmployeeCommand::List(args) => {
            let employees = hr.filtered_employees(&args.search);
            render_mode(
                output,
                employees.as_slice(),
                |items, w| items.iter().try_for_each(|e| employee_row(w, e)),
                |items, w| {
                    pretty_section(w, &format!("Employees ({})", items.len()))?;
                    for e in items {
                        writeln!(
                            w,
                            "{:<20} {:<24} {:<16} {:<10} {:>10.0}",
                            e.id().as_str(),
                            e.fields.name,
                            e.fields.department,
                            e.fields.status.as_str(),
                            e.fields.salary
                        )?;
                    }
                    Ok(())
                },
            )
        }
        EmployeeCommand::Remove(args) => {
            let id = RecordId::new(args.id.as_str());
            require_found(output, hr.employees().find(&id), "employee", &id)?;
            require_effect(output, hr.remove_employee(&id).await, "employee remove")?;
            render(output, &Removed { removed: &id }, |r, w| {
                writeln!(w, "removed {}", r.removed)
            })
        }
    }
}
