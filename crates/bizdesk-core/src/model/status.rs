//! Enumerated status and category values for every entity kind.
//!
//! Values serialize to the exact lowercase strings the records carry
//! (`"in-progress"` keeps its hyphen). Transitions between values are
//! unconstrained; any value may replace any other.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase().replace('_', "-")
}

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $( $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every value in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Wire representation.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = normalize(s);
                match normalized.as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ParseEnumError {
                        expected: $label,
                        got: s.to_string(),
                    }),
                }
            }
        }
    };
}

string_enum!(
    /// Employment state of an HR employee record.
    EmployeeStatus, "employee status" {
        Active => "active",
        Inactive => "inactive",
    }
);

string_enum!(
    /// Category of a paid-time-off request.
    PtoKind, "pto type" {
        Vacation => "vacation",
        Sick => "sick",
        Personal => "personal",
    }
);

string_enum!(
    PtoStatus, "pto status" {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
);

string_enum!(
    PayrollStatus, "payroll status" {
        Draft => "draft",
        Processed => "processed",
        Paid => "paid",
    }
);

string_enum!(
    /// Support ticket lifecycle values.
    TicketStatus, "ticket status" {
        Open => "open",
        InProgress => "in-progress",
        Resolved => "resolved",
        Closed => "closed",
    }
);

string_enum!(
    TicketPriority, "ticket priority" {
        Low => "low",
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
);

string_enum!(
    /// Who wrote a support message.
    SenderType, "sender type" {
        Customer => "customer",
        Agent => "agent",
    }
);

string_enum!(
    CampaignType, "campaign type" {
        Email => "email",
        Social => "social",
        Ads => "ads",
        Content => "content",
    }
);

string_enum!(
    CampaignStatus, "campaign status" {
        Draft => "draft",
        Scheduled => "scheduled",
        Active => "active",
        Completed => "completed",
        Paused => "paused",
    }
);

string_enum!(
    ContactStatus, "contact status" {
        Subscribed => "subscribed",
        Unsubscribed => "unsubscribed",
        Bounced => "bounced",
    }
);

string_enum!(
    TemplateType, "template type" {
        Email => "email",
        Social => "social",
        Landing => "landing",
    }
);

string_enum!(
    ProjectStatus, "project status" {
        Planning => "planning",
        InProgress => "in-progress",
        Review => "review",
        Completed => "completed",
    }
);

string_enum!(
    /// Three-level priority shared by projects and tasks.
    Priority, "priority" {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
);

string_enum!(
    /// Task board columns, in board order.
    TaskStatus, "task status" {
        Todo => "todo",
        InProgress => "in-progress",
        Review => "review",
        Done => "done",
    }
);

string_enum!(
    ChannelType, "channel type" {
        Public => "public",
        Private => "private",
        Direct => "direct",
    }
);

string_enum!(
    MessageType, "message type" {
        Text => "text",
        File => "file",
        Image => "image",
    }
);

string_enum!(
    /// Team member availability.
    Presence, "presence" {
        Online => "online",
        Away => "away",
        Busy => "busy",
        Offline => "offline",
    }
);

string_enum!(
    SiteStatus, "site status" {
        Draft => "draft",
        Published => "published",
        Archived => "archived",
    }
);

string_enum!(
    /// Building blocks of a website page.
    ElementType, "element type" {
        Header => "header",
        Text => "text",
        Image => "image",
        Button => "button",
        Form => "form",
        Gallery => "gallery",
        Video => "video",
    }
);

string_enum!(
    StaffRole, "staff role" {
        Admin => "admin",
        Manager => "manager",
        Employee => "employee",
    }
);
