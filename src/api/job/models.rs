use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Lifecycle label of a job application, one per kanban column.
///
/// There is no transition graph: any status may move to any other.
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum JobStatus {
    #[default]
    Applied,
    InProgress,
    Interview,
    Offer,
    Done,
    Rejected,
}

impl JobStatus {
    pub const ALL: [JobStatus; 6] = [
        JobStatus::Applied,
        JobStatus::InProgress,
        JobStatus::Interview,
        JobStatus::Offer,
        JobStatus::Done,
        JobStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Applied => "applied",
            JobStatus::InProgress => "inProgress",
            JobStatus::Interview => "interview",
            JobStatus::Offer => "offer",
            JobStatus::Done => "done",
            JobStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the six status labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStatus(pub String);

impl fmt::Display for InvalidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid status: {}", self.0)
    }
}

impl std::error::Error for InvalidStatus {}

impl FromStr for JobStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InvalidStatus(s.to_string()))
    }
}

/// A tracked job application as stored and returned by the API
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub company: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub position: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub source: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub resume_used: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notes: String,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub salary: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub contact_person: String,
    pub applied_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Case-insensitive substring match over the fields the board searches on.
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        [&self.company, &self.position, &self.source, &self.location]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

// Records written by older clients may hold `null` for text fields or drop them.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
pub(crate) fn sample_job(id: u64, company: &str) -> Job {
    let now = Utc::now();
    Job {
        id,
        company: company.to_string(),
        position: "Engineer".to_string(),
        source: String::new(),
        resume_used: String::new(),
        notes: String::new(),
        status: JobStatus::Applied,
        url: String::new(),
        salary: String::new(),
        location: String::new(),
        contact_person: String::new(),
        applied_date: now,
        updated_at: now,
    }
}
