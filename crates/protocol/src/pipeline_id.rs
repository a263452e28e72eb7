//! Pipeline identification
//!
//! `PipelineId` names the pipeline a forked unit of work belongs to. It is
//! also the `pipeline` dimension of every metric recorded by that fork.

use std::fmt;

/// Pipeline identifier
///
/// # Example
///
/// ```
/// use sluice_protocol::PipelineId;
///
/// let id = PipelineId::new("things");
/// assert_eq!(id.as_str(), "things");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PipelineId(String);

impl PipelineId {
    /// Create a new pipeline ID
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the pipeline ID as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PipelineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PipelineId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PipelineId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for PipelineId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
