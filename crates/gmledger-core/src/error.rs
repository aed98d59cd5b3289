use std::fmt;

/// Machine-readable error codes surfaced by the CLI and embedding hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    DataDirUnavailable,
    AlreadyCheckedIn,
    AlreadyGreeted,
    InvalidActivityKind,
    InvalidProfileName,
    MalformedPersistedState,
    StorageWriteFailed,
    LockContention,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::DataDirUnavailable => "E1002",
            Self::AlreadyCheckedIn => "E2001",
            Self::AlreadyGreeted => "E2002",
            Self::InvalidActivityKind => "E2003",
            Self::InvalidProfileName => "E2005",
            Self::MalformedPersistedState => "E3001",
            Self::StorageWriteFailed => "E5001",
            Self::LockContention => "E5002",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::DataDirUnavailable => "Data directory unavailable",
            Self::AlreadyCheckedIn => "Already checked in today",
            Self::AlreadyGreeted => "GM already sent today",
            Self::InvalidActivityKind => "Invalid activity kind",
            Self::InvalidProfileName => "Invalid profile name",
            Self::MalformedPersistedState => "Malformed persisted state",
            Self::StorageWriteFailed => "Storage write failed",
            Self::LockContention => "Lock contention",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and hosts.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in gmledger/config.toml and retry."),
            Self::DataDirUnavailable => Some("Set GM_DATA_DIR or pass --data-dir."),
            Self::AlreadyCheckedIn => Some("Come back after local midnight, or pass --force."),
            Self::AlreadyGreeted => Some("One GM per day. Try again after local midnight."),
            Self::InvalidActivityKind => Some("Use one of: check-in, greeting, mint, transfer."),
            Self::InvalidProfileName => Some("Provide a non-empty display name."),
            Self::MalformedPersistedState => {
                Some("The affected key was reset to empty; inspect the data directory.")
            }
            Self::StorageWriteFailed => Some("Check disk space and write permissions."),
            Self::LockContention => Some("Retry after the other `gm` process releases its lock."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
