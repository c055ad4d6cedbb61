use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::models::JobStatus;

/// Body of `POST /jobs` and `PUT /jobs/{id}`.
///
/// Company and position are required; every other field falls back to an
/// empty string and status to `applied`.
#[derive(Deserialize, Serialize, Debug, Default, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JobInput {
    #[serde(default)]
    #[validate(length(min = 1, message = "Company and position are required"))]
    pub company: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Company and position are required"))]
    pub position: String,
    pub source: Option<String>,
    pub resume_used: Option<String>,
    pub notes: Option<String>,
    pub status: Option<String>,
    pub url: Option<String>,
    pub salary: Option<String>,
    pub location: Option<String>,
    pub contact_person: Option<String>,
}

/// Body of `PATCH /jobs/{id}`. Absent fields are left untouched.
#[derive(Deserialize, Serialize, Debug, Default, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JobPatch {
    pub company: Option<String>,
    pub position: Option<String>,
    pub source: Option<String>,
    pub resume_used: Option<String>,
    pub notes: Option<String>,
    pub status: Option<String>,
    pub url: Option<String>,
    pub salary: Option<String>,
    pub location: Option<String>,
    pub contact_person: Option<String>,
}

impl JobPatch {
    pub fn is_empty(&self) -> bool {
        self.company.is_none()
            && self.position.is_none()
            && self.source.is_none()
            && self.resume_used.is_none()
            && self.notes.is_none()
            && self.status.is_none()
            && self.url.is_none()
            && self.salary.is_none()
            && self.location.is_none()
            && self.contact_person.is_none()
    }
}

/// Body of `PATCH /jobs/{id}/status`
#[derive(Deserialize, Serialize, Debug, Default, Clone, Validate)]
pub struct StatusUpdate {
    pub status: Option<String>,
}

/// Query string of `GET /jobs`
#[derive(Deserialize, Debug, Default)]
pub struct ListQuery {
    pub q: Option<String>,
}

/// Response for `DELETE /jobs/{id}`
#[derive(Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

/// Response for `GET /stats`. Statuses without jobs are omitted.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobStats {
    pub total: usize,
    pub by_status: BTreeMap<JobStatus, usize>,
}
