//! Command handlers for `bz`.
//!
//! Record commands open the workspace once through [`Workspace::open`] and
//! then drive a module façade from `bizdesk-core`. Every failure is rendered
//! as a coded [`CliError`](crate::output::CliError) before the handler
//! returns.

pub mod campaign;
pub mod channel;
pub mod completions;
pub mod employee;
pub mod init;
pub mod stats;
pub mod ticket;

use bizdesk_core::config::{self, ProjectConfig, UserConfig};
use bizdesk_core::db::SqliteStore;
use bizdesk_core::{ErrorCode, LocalSession, RecordId, RecordStore, SessionProvider};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use crate::account;
use crate::output::{OutputMode, fail};

/// Account selection shared by every record command.
#[derive(Debug, Clone, Copy)]
pub struct AccountFlags<'a> {
    pub account: Option<&'a str>,
    pub email: Option<&'a str>,
}

/// An opened workspace: config, store, and the acting account's session.
pub struct Workspace {
    pub config: ProjectConfig,
    store: Arc<dyn RecordStore>,
    session: Arc<LocalSession>,
}

impl Workspace {
    /// Locate `.bizdesk/` above `project_root`, resolve the account, and
    /// open the store.
    pub fn open(
        project_root: &Path,
        flags: AccountFlags<'_>,
        user: &UserConfig,
        output: OutputMode,
    ) -> anyhow::Result<Self> {
        let Some(dir) = config::find_workspace_dir(project_root) else {
            return fail(
                output,
                ErrorCode::NotInitialized,
                format!("no {} directory found above {}", config::WORKSPACE_DIR, project_root.display()),
            );
        };

        let project = match config::load_project_config(&dir) {
            Ok(project) => project,
            Err(err) => return fail(output, ErrorCode::ConfigParseError, format!("{err:#}")),
        };

        let Some(identity) = account::resolve_identity(flags.account, flags.email, user) else {
            return fail(output, ErrorCode::NotSignedIn, "no account selected");
        };

        let path = config::store_path(&dir, &project);
        let store = match SqliteStore::open(&path) {
            Ok(store) => store,
            Err(err) => {
                return fail(
                    output,
                    ErrorCode::StoreUnavailable,
                    format!("cannot open {}: {err:#}", path.display()),
                );
            }
        };
        debug!(account = %identity.id, store = %path.display(), "workspace opened");

        Ok(Self {
            config: project,
            session: Arc::new(LocalSession::signed_in(identity)),
            store: Arc::new(store),
        })
    }

    pub fn store(&self) -> Arc<dyn RecordStore> {
        Arc::clone(&self.store)
    }

    pub fn session(&self) -> Arc<dyn SessionProvider> {
        self.session.clone()
    }
}

/// Parse a status/category value, reporting E2002 on failure.
pub fn parse_value<T>(output: OutputMode, field: &str, raw: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw.parse() {
        Ok(value) => Ok(value),
        Err(err) => fail(output, ErrorCode::InvalidEnumValue, format!("{field}: {err}")),
    }
}

/// Fail with E3002 when a façade's initial load did not reach the store.
pub fn ensure_loaded(output: OutputMode, loaded: bool, what: &str) -> anyhow::Result<()> {
    if loaded {
        Ok(())
    } else {
        fail(output, ErrorCode::StoreUnavailable, format!("could not load {what}"))
    }
}

/// Fail with E2001 unless `found` holds a record.
pub fn require_found<T>(output: OutputMode, found: Option<T>, kind: &str, id: &RecordId) -> anyhow::Result<T> {
    match found {
        Some(record) => Ok(record),
        None => fail(output, ErrorCode::RecordNotFound, format!("{kind} '{id}' not found")),
    }
}

/// Fail with E4001 when a mutation was swallowed.
pub fn require_effect(output: OutputMode, applied: bool, action: &str) -> anyhow::Result<()> {
    if applied {
        Ok(())
    } else {
        fail(output, ErrorCode::NoEffect, format!("{action} had no effect"))
    }
}

/// Fail with E4001 when a create-style call returned nothing.
pub fn require_record<T>(output: OutputMode, record: Option<T>, action: &str) -> anyhow::Result<T> {
    match record {
        Some(record) => Ok(record),
        None => fail(output, ErrorCode::NoEffect, format!("{action} had no effect")),
    }
}
