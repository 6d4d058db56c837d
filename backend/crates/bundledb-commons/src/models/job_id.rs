//! Queue job identifier.

use super::JobType;
use crate::errors::CommonError;
use crate::helpers::new_token;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a queued job, namespaced as `<job_type>_<token>`.
///
/// The job type prefix lets the worker dispatch on the id alone and lets
/// housekeeping find every backing key that mentions a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobId(String);

impl JobId {
    /// Generate a fresh id for `job_type`.
    pub fn generate(job_type: JobType) -> Self {
        Self(format!("{}_{}", job_type.as_str(), new_token()))
    }

    /// Parse an existing id, rejecting unknown prefixes and path characters.
    pub fn parse(id: impl Into<String>) -> Result<Self, CommonError> {
        let id = id.into();
        if id.contains('/') || id.contains('\\') {
            return Err(CommonError::InvalidIdentifier(format!(
                "job id '{}' contains a path separator",
                id
            )));
        }
        match JobType::from_job_id(&id) {
            Some(_) => Ok(Self(id)),
            None => Err(CommonError::InvalidIdentifier(format!("unknown job id '{}'", id))),
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The job type encoded in the prefix.
    pub fn job_type(&self) -> Option<JobType> {
        JobType::from_job_id(&self.0)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for JobId {
    type Error = CommonError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<JobId> for String {
    fn from(id: JobId) -> Self {
        id.0
    }
}

impl AsRef<str> for JobId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
