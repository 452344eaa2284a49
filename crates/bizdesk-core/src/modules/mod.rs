//! Per-module façades over the generic view-models.
//!
//! Each façade wires one dashboard module's collections, selection, and
//! summary together and adds the module's own mutation rules on top.

pub mod chat;
pub mod hr;
pub mod marketing;
pub mod projects;
pub mod settings;
pub mod support;
pub mod website;

pub use chat::TeamChat;
pub use hr::HrDesk;
pub use marketing::MarketingHub;
pub use projects::ProjectBoard;
pub use settings::StaffDirectory;
pub use support::SupportDesk;
pub use website::SiteBuilder;
