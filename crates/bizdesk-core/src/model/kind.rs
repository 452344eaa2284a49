use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::status::ParseEnumError;

/// The fixed record categories held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Employee,
    PtoRequest,
    PayrollEntry,
    Ticket,
    Message,
    Campaign,
    Contact,
    Template,
    Project,
    Task,
    Channel,
    ChatMessage,
    TeamMember,
    WebsiteProject,
    StaffMember,
}

impl EntityKind {
    pub const ALL: &'static [Self] = &[
        Self::Employee,
        Self::PtoRequest,
        Self::PayrollEntry,
        Self::Ticket,
        Self::Message,
        Self::Campaign,
        Self::Contact,
        Self::Template,
        Self::Project,
        Self::Task,
        Self::Channel,
        Self::ChatMessage,
        Self::TeamMember,
        Self::WebsiteProject,
        Self::StaffMember,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::PtoRequest => "pto_request",
            Self::PayrollEntry => "payroll_entry",
            Self::Ticket => "ticket",
            Self::Message => "message",
            Self::Campaign => "campaign",
            Self::Contact => "contact",
            Self::Template => "template",
            Self::Project => "project",
            Self::Task => "task",
            Self::Channel => "channel",
            Self::ChatMessage => "chat_message",
            Self::TeamMember => "team_member",
            Self::WebsiteProject => "website_project",
            Self::StaffMember => "staff_member",
        }
    }

    /// Prefix used for store-assigned identifiers (`tkt-3k9x0a2m`).
    #[must_use]
    pub const fn id_prefix(self) -> &'static str {
        match self {
            Self::Employee => "emp",
            Self::PtoRequest => "pto",
            Self::PayrollEntry => "pay",
            Self::Ticket => "tkt",
            Self::Message => "msg",
            Self::Campaign => "cmp",
            Self::Contact => "con",
            Self::Template => "tpl",
            Self::Project => "prj",
            Self::Task => "tsk",
            Self::Channel => "chn",
            Self::ChatMessage => "cht",
            Self::TeamMember => "mbr",
            Self::WebsiteProject => "web",
            Self::StaffMember => "stf",
        }
    }

    /// Fields that hold ordered string (or object) sequences.
    ///
    /// These are the fields that legacy writers sometimes stored as a
    /// JSON-encoded string; the store codec decodes them back into arrays.
    #[must_use]
    pub const fn array_fields(self) -> &'static [&'static str] {
        match self {
            Self::Contact => &["tags"],
            Self::Project => &["team_members"],
            Self::Channel => &["members"],
            Self::WebsiteProject => &["pages"],
            Self::StaffMember => &["permissions"],
            _ => &[],
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ParseEnumError {
                expected: "entity kind",
                got: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::EntityKind;
    use std::collections::HashSet;

    #[test]
    fn names_and_prefixes_are_unique() {
        let mut names = HashSet::new();
        let mut prefixes = HashSet::new();
        for kind in EntityKind::ALL {
            assert!(names.insert(kind.as_str()), "duplicate name {kind}");
            assert!(prefixes.insert(kind.id_prefix()), "duplicate prefix {kind}");
        }
    }

    #[test]
    fn parse_accepts_display_form_and_hyphens() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.to_string().parse::<EntityKind>(), Ok(*kind));
        }
        assert_eq!("chat-message".parse(), Ok(EntityKind::ChatMessage));
        assert!("invoice".parse::<EntityKind>().is_err());
    }

    #[test]
    fn serde_name_matches_display() {
        let json = serde_json::to_string(&EntityKind::WebsiteProject).expect("serialize");
        assert_eq!(json, "\"website_project\"");
    }
}
