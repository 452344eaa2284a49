//! bizdesk-core library.
//!
//! Owner-scoped list/detail view-models over a pluggable record store.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums at the store boundary, `anyhow::Result`
//!   for setup paths (config, opening databases).
//! - **Logging**: `tracing` macros with `kind`, `id`, and `error` fields.
//! - **Failures at the view-model layer** are logged and reported as
//!   `false`/`None`; in-memory state is left unchanged.

pub mod aggregate;
pub mod codec;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod modules;
pub mod query;
pub mod selection;
pub mod session;
pub mod store;
pub mod view_model;

pub use error::ErrorCode;
pub use model::{Entity, OwnerId, Record, RecordId};
pub use selection::SelectionController;
pub use session::{Identity, LocalSession, SessionProvider};
pub use store::{RecordStore, StoreError};
pub use view_model::EntityViewModel;
