use std::fmt;

use crate::store::StoreError;

/// Machine-readable error codes for callers that branch on failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    InvalidParameter,
    IdentityPersistFailed,
    EdgePersistFailed,
    Cancelled,
    StoreUnavailable,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::InvalidParameter => "E2001",
            Self::IdentityPersistFailed => "E5001",
            Self::EdgePersistFailed => "E5002",
            Self::Cancelled => "E5003",
            Self::StoreUnavailable => "E6001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file unreadable or invalid",
            Self::InvalidParameter => "Invalid seed parameter",
            Self::IdentityPersistFailed => "Identity persistence failed",
            Self::EdgePersistFailed => "Follow edge persistence failed",
            Self::Cancelled => "Seed run cancelled",
            Self::StoreUnavailable => "Store unavailable",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => {
                Some("Fix the TOML syntax, or point --config at an existing file.")
            }
            Self::InvalidParameter => {
                Some("Use finite, non-negative values; boosts are capped at 1e6.")
            }
            Self::IdentityPersistFailed => {
                Some("Check the identity store; no follow edges were generated.")
            }
            Self::EdgePersistFailed => {
                Some("The graph exists in memory; re-run against a healthy store to persist it.")
            }
            Self::Cancelled => None,
            Self::StoreUnavailable => Some("Check the database path and write permissions."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors that abort a seed run.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    /// A numeric request parameter cannot drive the generator.
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// The identity store refused an identity. The run stops before any
    /// edge exists, so no partial graph is reported.
    #[error("failed to persist identity {external_id}")]
    IdentityPersistence {
        external_id: String,
        #[source]
        source: StoreError,
    },

    /// The cancellation token fired before the identity pool was complete.
    #[error("seed run cancelled after {persisted} of {requested} identities")]
    Cancelled { persisted: usize, requested: usize },
}

impl SeedError {
    /// The stable [`ErrorCode`] for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidParameter { .. } => ErrorCode::InvalidParameter,
            Self::IdentityPersistence { .. } => ErrorCode::IdentityPersistFailed,
            Self::Cancelled { .. } => ErrorCode::Cancelled,
        }
    }
}
