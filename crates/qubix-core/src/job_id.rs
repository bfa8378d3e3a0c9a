//! Opaque job identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize};

use crate::CoreError;

/// Maximum length of a job identifier in bytes.
pub const MAX_JOB_ID_LEN: usize = 64;

/// Identifier supplied by the consumer when a job is created.
///
/// Non-empty, at most [`MAX_JOB_ID_LEN`] bytes, printable ASCII.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Validates and wraps a job identifier.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidJobId` if the identifier is empty, too long,
    /// or contains non-printable characters.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.is_empty() {
            return Err(CoreError::InvalidJobId("job id must not be empty".into()));
        }
        if id.len() > MAX_JOB_ID_LEN {
            return Err(CoreError::InvalidJobId(format!(
                "job id must be at most {MAX_JOB_ID_LEN} bytes, got {}",
                id.len()
            )));
        }
        if !id.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(CoreError::InvalidJobId(format!(
                "job id must be printable ASCII without spaces: {id:?}"
            )));
        }
        Ok(Self(id))
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for JobId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for JobId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_typical_id() {
        let id = JobId::new("job-123").unwrap();
        assert_eq!(id.as_str(), "job-123");
    }

    #[test]
    fn rejects_empty() {
        assert!(JobId::new("").is_err());
    }

    #[test]
    fn accepts_exactly_max_len() {
        assert!(JobId::new("x".repeat(MAX_JOB_ID_LEN)).is_ok());
        assert!(JobId::new("x".repeat(MAX_JOB_ID_LEN + 1)).is_err());
    }

    #[test]
    fn rejects_whitespace() {
        assert!(JobId::new("job 1").is_err());
        assert!(JobId::new("job\n").is_err());
    }

    #[test]
    fn deserialize_validates() {
        assert!(serde_json::from_str::<JobId>("\"\"").is_err());
        let id: JobId = serde_json::from_str("\"job-7\"").unwrap();
        assert_eq!(id.to_string(), "job-7");
    }
}
