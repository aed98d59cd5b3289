//! Activity kinds recorded by the ledger.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four kinds of confirmed user action the ledger records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActivityKind {
    /// Daily check-in transaction; the only kind that earns points.
    CheckIn,
    /// The on-chain "GM" greeting.
    Greeting,
    /// NFT mint.
    Mint,
    /// Outgoing value transfer.
    Transfer,
}

/// Error returned when parsing an unknown activity kind string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownActivityKind {
    /// The unrecognised input string.
    pub raw: String,
}

impl fmt::Display for UnknownActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown activity kind '{}': expected one of check-in, greeting, mint, transfer",
            self.raw
        )
    }
}

impl std::error::Error for UnknownActivityKind {}

impl ActivityKind {
    /// All kinds in display order.
    pub const ALL: [Self; 4] = [Self::CheckIn, Self::Greeting, Self::Mint, Self::Transfer];

    /// Canonical kebab-case string used in storage and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CheckIn => "check-in",
            Self::Greeting => "greeting",
            Self::Mint => "mint",
            Self::Transfer => "transfer",
        }
    }

    /// Short label for feeds and tables.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CheckIn => "Check-in",
            Self::Greeting => "GM",
            Self::Mint => "Mint",
            Self::Transfer => "Transfer",
        }
    }

    /// Whether events of this kind earn check-in points.
    #[must_use]
    pub const fn earns_points(self) -> bool {
        matches!(self, Self::CheckIn)
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = UnknownActivityKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "check-in" | "checkin" => Ok(Self::CheckIn),
            "greeting" | "gm" => Ok(Self::Greeting),
            "mint" => Ok(Self::Mint),
            "transfer" | "transaction" => Ok(Self::Transfer),
            _ => Err(UnknownActivityKind { raw: s.to_string() }),
        }
    }
}

impl Serialize for ActivityKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ActivityKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}
