use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized instrument identifier, e.g. an NSE code such as `TCS`.
///
/// The only way to build one is [`Symbol::parse`], so holding a `Symbol` means
/// the identifier is already trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Trims surrounding whitespace and rejects identifiers that end up empty.
    /// Case is preserved.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidSymbol(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Symbol {
    type Error = CoreError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Splits a comma-separated list of identifiers as typed into a form field.
///
/// Entries are returned raw; blank entries are kept so that the caller reports
/// them as invalid instead of silently dropping them.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::to_string).collect()
}
