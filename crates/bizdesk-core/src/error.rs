use std::fmt;

/// Machine-readable error codes surfaced by the CLI and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    NotSignedIn,
    RecordNotFound,
    InvalidEnumValue,
    InvalidPatch,
    DuplicateRecord,
    CorruptRecord,
    StoreUnavailable,
    LockContention,
    NoEffect,
    InternalUnexpected,
}

impl ErrorCode {
    pub const ALL: &'static [Self] = &[
        Self::NotInitialized,
        Self::ConfigParseError,
        Self::NotSignedIn,
        Self::RecordNotFound,
        Self::InvalidEnumValue,
        Self::InvalidPatch,
        Self::DuplicateRecord,
        Self::CorruptRecord,
        Self::StoreUnavailable,
        Self::LockContention,
        Self::NoEffect,
        Self::InternalUnexpected,
    ];

    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::NotSignedIn => "E1003",
            Self::RecordNotFound => "E2001",
            Self::InvalidEnumValue => "E2002",
            Self::InvalidPatch => "E2003",
            Self::DuplicateRecord => "E2004",
            Self::CorruptRecord => "E3001",
            Self::StoreUnavailable => "E3002",
            Self::LockContention => "E3003",
            Self::NoEffect => "E4001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Workspace not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::NotSignedIn => "No signed-in account",
            Self::RecordNotFound => "Record not found",
            Self::InvalidEnumValue => "Invalid status or category value",
            Self::InvalidPatch => "Patch is not a field object",
            Self::DuplicateRecord => "Record id already exists",
            Self::CorruptRecord => "Stored record could not be decoded",
            Self::StoreUnavailable => "Record store unavailable",
            Self::LockContention => "Lock contention",
            Self::NoEffect => "Operation had no effect",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint for operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `bz init` to create .bizdesk/ in this directory."),
            Self::ConfigParseError => Some("Fix syntax in .bizdesk/config.toml and retry."),
            Self::NotSignedIn => {
                Some("Pass --account, set BIZDESK_ACCOUNT, or add `account` to the user config.")
            }
            Self::RecordNotFound => Some("Check the id with a `list` command for the same account."),
            Self::InvalidEnumValue => Some("Use one of the values listed in `--help`."),
            Self::InvalidPatch | Self::CorruptRecord => {
                Some("Retry once. If persistent, report a bug with logs.")
            }
            Self::DuplicateRecord => Some("Omit the id to let the store assign one."),
            Self::StoreUnavailable => Some("Check the store path and file permissions."),
            Self::LockContention => Some("Retry after the other `bz` process finishes."),
            Self::NoEffect => Some("Run with BIZDESK_LOG=debug to see the swallowed store error."),
            Self::InternalUnexpected => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
