use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinds of mutation the serializing worker applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    /// Insert one row.
    NewRecord,
    /// Overwrite fields of already-resolved rows.
    UpdateRows,
    /// Create a bundle or extend its schema.
    NewTable,
}

impl JobType {
    pub const ALL: [JobType; 3] = [JobType::NewRecord, JobType::UpdateRows, JobType::NewTable];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::NewRecord => "new_record",
            JobType::UpdateRows => "update_rows",
            JobType::NewTable => "new_table",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "new_record" => Some(JobType::NewRecord),
            "update_rows" => Some(JobType::UpdateRows),
            "new_table" => Some(JobType::NewTable),
            _ => None,
        }
    }

    /// Recover the job type from a `<job_type>_<token>` identifier.
    pub fn from_job_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| {
            id.strip_prefix(t.as_str())
                .is_some_and(|rest| rest.starts_with('_') && rest.len() > 1)
        })
    }
}

impl FromStr for JobType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobType::from_str_opt(s).ok_or_else(|| format!("Invalid JobType: {}", s))
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for t in JobType::ALL {
            assert_eq!(t.as_str().parse::<JobType>().unwrap(), t);
        }
        assert!("flush".parse::<JobType>().is_err());
    }

    #[test]
    fn test_from_job_id() {
        assert_eq!(JobType::from_job_id("new_record_abc"), Some(JobType::NewRecord));
        assert_eq!(JobType::from_job_id("update_rows_1"), Some(JobType::UpdateRows));
        assert_eq!(JobType::from_job_id("new_table_x"), Some(JobType::NewTable));
        assert_eq!(JobType::from_job_id("new_record_"), None);
        assert_eq!(JobType::from_job_id("new_records"), None);
    }
}
