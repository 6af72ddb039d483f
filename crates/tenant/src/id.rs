use crate::error::TenantIdError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized tenant identifier, 1:1 with a physical schema name.
///
/// Construction normalizes the raw value (trim, lowercase, `-` to `_`) and
/// rejects anything outside `[a-z0-9_]`. A `TenantId` is the only string the
/// database layer ever interpolates into SQL as a schema name, so the charset
/// check here is load-bearing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    pub fn new(raw: &str) -> Result<Self, TenantIdError> {
        let normalized = Self::normalize(raw);
        if normalized.is_empty() {
            return Err(TenantIdError::Empty);
        }
        if !normalized
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(TenantIdError::InvalidCharacters(normalized));
        }
        Ok(Self(normalized))
    }

    /// Lowercase, trimmed, hyphens mapped to underscores. Matches how schema
    /// names are laid out on disk: tenant `ACME-Corp` lives in `acme_corp`.
    fn normalize(raw: &str) -> String {
        raw.trim().to_ascii_lowercase().replace('-', "_")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The physical schema name for this tenant.
    pub fn schema_name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
