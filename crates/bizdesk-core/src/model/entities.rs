//! Field sets for every entity kind, with their partial-update patches.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::status::{
    CampaignStatus, CampaignType, ChannelType, ContactStatus, ElementType, EmployeeStatus,
    MessageType, PayrollStatus, Presence, Priority, ProjectStatus, PtoKind, PtoStatus, SenderType,
    SiteStatus, StaffRole, TaskStatus, TemplateType, TicketPriority, TicketStatus,
};
use super::{ChildEntity, Entity, EntityKind, RecordId, Stateful};
use crate::query::QueryField;

// ---------------------------------------------------------------------------
// HR
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub name: String,
    pub email: String,
    pub position: String,
    pub department: String,
    pub salary: f64,
    pub hire_date: NaiveDate,
    pub status: EmployeeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmployeePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EmployeeStatus>,
}

impl Entity for Employee {
    const KIND: EntityKind = EntityKind::Employee;
    type Patch = EmployeePatch;

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.email, &self.department]
    }
}

impl Stateful for Employee {
    type Status = EmployeeStatus;

    fn status(&self) -> EmployeeStatus {
        self.status
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtoRequest {
    pub employee_id: RecordId,
    pub employee_name: String,
    #[serde(rename = "type")]
    pub kind: PtoKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: u32,
    pub status: PtoStatus,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PtoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PtoStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Entity for PtoRequest {
    const KIND: EntityKind = EntityKind::PtoRequest;
    type Patch = PtoPatch;

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.employee_name, &self.reason]
    }
}

impl Stateful for PtoRequest {
    type Status = PtoStatus;

    fn status(&self) -> PtoStatus {
        self.status
    }
}

impl ChildEntity for PtoRequest {
    const PARENT: QueryField = QueryField::EmployeeId;

    fn parent_id(&self) -> &RecordId {
        &self.employee_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollEntry {
    pub employee_id: RecordId,
    pub employee_name: String,
    pub period: String,
    pub base_salary: f64,
    pub overtime: f64,
    pub bonuses: f64,
    pub deductions: f64,
    pub net_pay: f64,
    pub status: PayrollStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PayrollPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overtime: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonuses: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deductions: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_pay: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PayrollStatus>,
}

impl Entity for PayrollEntry {
    const KIND: EntityKind = EntityKind::PayrollEntry;
    type Patch = PayrollPatch;

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.employee_name, &self.period]
    }
}

impl Stateful for PayrollEntry {
    type Status = PayrollStatus;

    fn status(&self) -> PayrollStatus {
        self.status
    }
}

// ---------------------------------------------------------------------------
// Support
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub customer_name: String,
    pub customer_email: String,
    pub assigned_to: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satisfaction_rating: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TicketPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TicketPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub satisfaction_rating: Option<u8>,
}

impl TicketPatch {
    #[must_use]
    pub fn status(status: TicketStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

impl Entity for Ticket {
    const KIND: EntityKind = EntityKind::Ticket;
    type Patch = TicketPatch;

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.customer_name, &self.customer_email]
    }
}

impl Stateful for Ticket {
    type Status = TicketStatus;

    fn status(&self) -> TicketStatus {
        self.status
    }
}

/// One entry in a ticket's conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportMessage {
    pub ticket_id: RecordId,
    pub sender: String,
    pub sender_type: SenderType,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SupportMessagePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Entity for SupportMessage {
    const KIND: EntityKind = EntityKind::Message;
    type Patch = SupportMessagePatch;

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.message, &self.sender]
    }
}

impl ChildEntity for SupportMessage {
    const PARENT: QueryField = QueryField::TicketId;

    fn parent_id(&self) -> &RecordId {
        &self.ticket_id
    }
}

// ---------------------------------------------------------------------------
// Marketing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CampaignType,
    pub status: CampaignStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub content: String,
    pub audience: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sent_count: u64,
    #[serde(default)]
    pub open_rate: f64,
    #[serde(default)]
    pub click_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CampaignPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CampaignStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_rate: Option<f64>,
}

impl Entity for Campaign {
    const KIND: EntityKind = EntityKind::Campaign;
    type Patch = CampaignPatch;

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.audience]
    }
}

impl Stateful for Campaign {
    type Status = CampaignStatus;

    fn status(&self) -> CampaignStatus {
        self.status
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: ContactStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ContactStatus>,
}

impl Entity for Contact {
    const KIND: EntityKind = EntityKind::Contact;
    type Patch = ContactPatch;

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.email, &self.first_name, &self.last_name]
    }
}

impl Stateful for Contact {
    type Status = ContactStatus;

    fn status(&self) -> ContactStatus {
        self.status
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TemplateType,
    pub thumbnail: String,
    pub content: String,
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplatePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Entity for Template {
    const KIND: EntityKind = EntityKind::Template;
    type Patch = TemplatePatch;

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.category]
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub progress: u8,
    #[serde(default)]
    pub team_members: Vec<String>,
    pub budget: f64,
    pub client: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_members: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
}

impl Entity for Project {
    const KIND: EntityKind = EntityKind::Project;
    type Patch = ProjectPatch;

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.client]
    }
}

impl Stateful for Project {
    type Status = ProjectStatus;

    fn status(&self) -> ProjectStatus {
        self.status
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub project_id: RecordId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub assignee: String,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl Entity for Task {
    const KIND: EntityKind = EntityKind::Task;
    type Patch = TaskPatch;

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.assignee]
    }
}

impl Stateful for Task {
    type Status = TaskStatus;

    fn status(&self) -> TaskStatus {
        self.status
    }
}

impl ChildEntity for Task {
    const PARENT: QueryField = QueryField::ProjectId;

    fn parent_id(&self) -> &RecordId {
        &self.project_id
    }
}

// ---------------------------------------------------------------------------
// Team chat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ChannelType,
    #[serde(default)]
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChannelPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<String>>,
}

impl Entity for Channel {
    const KIND: EntityKind = EntityKind::Channel;
    type Patch = ChannelPatch;

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.description]
    }
}

impl Stateful for Channel {
    type Status = ChannelType;

    fn status(&self) -> ChannelType {
        self.kind
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub emoji: String,
    pub users: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub channel_id: RecordId,
    pub sender: String,
    pub sender_name: String,
    pub message: String,
    pub message_type: MessageType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reactions: Vec<Reaction>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChatMessagePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reactions: Option<Vec<Reaction>>,
}

impl Entity for ChatMessage {
    const KIND: EntityKind = EntityKind::ChatMessage;
    type Patch = ChatMessagePatch;

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.message, &self.sender_name]
    }
}

impl ChildEntity for ChatMessage {
    const PARENT: QueryField = QueryField::ChannelId;

    fn parent_id(&self) -> &RecordId {
        &self.channel_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub status: Presence,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeamMemberPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Presence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Entity for TeamMember {
    const KIND: EntityKind = EntityKind::TeamMember;
    type Patch = TeamMemberPatch;

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.email, &self.title]
    }
}

impl Stateful for TeamMember {
    type Status = Presence;

    fn status(&self) -> Presence {
        self.status
    }
}

// ---------------------------------------------------------------------------
// Website builder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A placed block on a page. `content` and `styles` are free-form objects
/// whose shape depends on the element type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageElement {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementType,
    pub content: Value,
    pub styles: Value,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebsitePage {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub content: Vec<PageElement>,
    #[serde(default)]
    pub is_homepage: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebsiteProject {
    pub name: String,
    pub description: String,
    pub domain: String,
    pub template: String,
    pub status: SiteStatus,
    #[serde(default)]
    pub pages: Vec<WebsitePage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WebsiteProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SiteStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<WebsitePage>>,
}

impl Entity for WebsiteProject {
    const KIND: EntityKind = EntityKind::WebsiteProject;
    type Patch = WebsiteProjectPatch;

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.domain]
    }
}

impl Stateful for WebsiteProject {
    type Status = SiteStatus;

    fn status(&self) -> SiteStatus {
        self.status
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Dashboard user managed from the settings screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    pub email: String,
    pub name: String,
    pub role: StaffRole,
    pub department: String,
    pub status: EmployeeStatus,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StaffPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<StaffRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EmployeeStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
}

impl Entity for StaffMember {
    const KIND: EntityKind = EntityKind::StaffMember;
    type Patch = StaffPatch;

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.email, &self.department]
    }
}

impl Stateful for StaffMember {
    type Status = EmployeeStatus;

    fn status(&self) -> EmployeeStatus {
        self.status
    }
}
