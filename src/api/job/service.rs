use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex as StdMutex};

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use validator::Validate;

use crate::api::validation::{first_message, ErrorResponse};
use crate::db::store::{JobStore, StorageBackend, StoreError};
use super::dto::{JobInput, JobPatch, JobStats};
use super::models::{Job, JobStatus};

/// Service-level errors
#[derive(Debug)]
pub enum ServiceError {
    /// Missing required fields or an unknown status
    InvalidInput(String),

    /// No job with this id
    NotFound(u64),

    /// The storage backend failed
    Storage(StoreError),

    /// The id counter cannot advance any further
    IdsExhausted,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            ServiceError::NotFound(id) => write!(f, "Job not found: {}", id),
            ServiceError::Storage(e) => write!(f, "Storage error: {}", e),
            ServiceError::IdsExhausted => write!(f, "No job ids left"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        ServiceError::Storage(e)
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Storage(_) | ServiceError::IdsExhausted => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::InvalidInput(msg) => {
                warn!("Validation error: {}", msg);
                HttpResponse::BadRequest().json(ErrorResponse::new(msg.clone()))
            }
            ServiceError::NotFound(id) => {
                warn!("Job not found: {}", id);
                HttpResponse::NotFound().json(ErrorResponse::new("Job not found"))
            }
            ServiceError::Storage(e) => {
                error!("Storage error: {}", e);
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Internal server error".to_string(),
                    message: Some(e.to_string()),
                })
            }
            ServiceError::IdsExhausted => {
                error!("Job id counter exhausted");
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Internal server error".to_string(),
                    message: Some(self.to_string()),
                })
            }
        }
    }
}

fn parse_status(raw: &str) -> Result<JobStatus, ServiceError> {
    raw.parse()
        .map_err(|_| ServiceError::InvalidInput("Invalid status".to_string()))
}

/// Hands out strictly increasing timestamps so a later mutation always
/// sorts ahead of an earlier one, even when the wall clock does not move.
#[derive(Debug)]
struct Clock {
    last: StdMutex<DateTime<Utc>>,
}

impl Clock {
    fn new() -> Self {
        Self {
            last: StdMutex::new(DateTime::<Utc>::MIN_UTC),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        let mut last = self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let now = Utc::now();
        let stamp = if now > *last {
            now
        } else {
            *last + Duration::microseconds(1)
        };
        *last = stamp;
        stamp
    }
}

/// Overwrite every mutable field from a create/replace body
fn fill(job: &mut Job, input: JobInput, status: JobStatus) {
    job.company = input.company;
    job.position = input.position;
    job.source = input.source.unwrap_or_default();
    job.resume_used = input.resume_used.unwrap_or_default();
    job.notes = input.notes.unwrap_or_default();
    job.status = status;
    job.url = input.url.unwrap_or_default();
    job.salary = input.salary.unwrap_or_default();
    job.location = input.location.unwrap_or_default();
    job.contact_person = input.contact_person.unwrap_or_default();
}

fn set_if_some(field: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *field = value;
    }
}

/// Job service containing business logic
///
/// Every operation loads the whole collection, changes it in memory and
/// writes it back. Mutations within this process are serialized; writers in
/// other processes sharing the backend can still overwrite each other.
pub struct JobService {
    store: Arc<dyn JobStore>,
    write_lock: Mutex<()>,
    clock: Clock,
}

impl JobService {
    /// Create a new JobService instance
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
            clock: Clock::new(),
        }
    }

    pub fn backend(&self) -> StorageBackend {
        self.store.backend()
    }

    /// Check that the storage backend answers
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }

    /// All jobs, most recently updated first.
    ///
    /// A non-blank `query` keeps only jobs whose company, position, source
    /// or location contains it, ignoring case.
    pub async fn list_jobs(&self, query: Option<&str>) -> Result<Vec<Job>, ServiceError> {
        let mut jobs = self.store.load_jobs().await?;

        if let Some(needle) = query.map(str::trim).filter(|q| !q.is_empty()) {
            let needle = needle.to_lowercase();
            jobs.retain(|job| job.matches(&needle));
        }

        jobs.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        debug!("Service: Listing {} jobs", jobs.len());
        Ok(jobs)
    }

    pub async fn get_job(&self, id: u64) -> Result<Job, ServiceError> {
        self.store
            .load_jobs()
            .await?
            .into_iter()
            .find(|job| job.id == id)
            .ok_or(ServiceError::NotFound(id))
    }

    /// Create a job
    ///
    /// # Business Logic
    /// - Requires company and position
    /// - Takes the next id and advances the counter before the job is saved,
    ///   so an id is never handed out twice
    /// - Defaults optional fields to empty strings and status to `applied`
    pub async fn create_job(&self, input: JobInput) -> Result<Job, ServiceError> {
        input
            .validate()
            .map_err(|e| ServiceError::InvalidInput(first_message(&e)))?;
        let status = match input.status.as_deref() {
            None | Some("") => JobStatus::default(),
            Some(raw) => parse_status(raw)?,
        };

        info!(
            "Service: Creating job company={}, position={}",
            input.company, input.position
        );

        let _guard = self.write_lock.lock().await;
        let mut jobs = self.store.load_jobs().await?;

        // The counter wins unless it lags behind ids already stored
        let counter = self.store.next_id().await?;
        let id = match jobs.iter().map(|job| job.id).max() {
            Some(highest) => highest
                .checked_add(1)
                .ok_or(ServiceError::IdsExhausted)?
                .max(counter),
            None => counter,
        };
        let following = id.checked_add(1).ok_or(ServiceError::IdsExhausted)?;
        self.store.set_next_id(following).await?;

        let now = self.clock.now();
        let mut job = Job {
            id,
            company: String::new(),
            position: String::new(),
            source: String::new(),
            resume_used: String::new(),
            notes: String::new(),
            status,
            url: String::new(),
            salary: String::new(),
            location: String::new(),
            contact_person: String::new(),
            applied_date: now,
            updated_at: now,
        };
        fill(&mut job, input, status);

        jobs.push(job.clone());
        self.store.save_jobs(&jobs).await?;

        info!("Service: Job created successfully with id={}", id);
        Ok(job)
    }

    /// Replace every mutable field of a job.
    ///
    /// The body is validated like a create; omitted optional fields are
    /// reset to empty strings and an omitted status to `applied`. The id and
    /// applied date are kept.
    pub async fn replace_job(&self, id: u64, input: JobInput) -> Result<Job, ServiceError> {
        input
            .validate()
            .map_err(|e| ServiceError::InvalidInput(first_message(&e)))?;
        let status = match input.status.as_deref() {
            None | Some("") => JobStatus::default(),
            Some(raw) => parse_status(raw)?,
        };

        let _guard = self.write_lock.lock().await;
        let mut jobs = self.store.load_jobs().await?;
        let job = jobs
            .iter_mut()
            .find(|job| job.id == id)
            .ok_or(ServiceError::NotFound(id))?;

        fill(job, input, status);
        job.updated_at = self.clock.now();
        let job = job.clone();

        self.store.save_jobs(&jobs).await?;
        info!("Service: Job {} replaced", id);
        Ok(job)
    }

    /// Change only the supplied fields of a job.
    ///
    /// An empty string is a real value and replaces an optional field;
    /// company and position can never be emptied. The update time moves only
    /// when something was supplied.
    pub async fn patch_job(&self, id: u64, patch: JobPatch) -> Result<Job, ServiceError> {
        let status = patch.status.as_deref().map(parse_status).transpose()?;
        let blanks_required = [&patch.company, &patch.position]
            .into_iter()
            .any(|field| field.as_deref().is_some_and(str::is_empty));
        if blanks_required {
            return Err(ServiceError::InvalidInput(
                "Company and position are required".to_string(),
            ));
        }

        let _guard = self.write_lock.lock().await;
        let mut jobs = self.store.load_jobs().await?;
        let job = jobs
            .iter_mut()
            .find(|job| job.id == id)
            .ok_or(ServiceError::NotFound(id))?;

        if patch.is_empty() {
            debug!("Service: Empty patch for job {}", id);
            return Ok(job.clone());
        }

        set_if_some(&mut job.company, patch.company);
        set_if_some(&mut job.position, patch.position);
        set_if_some(&mut job.source, patch.source);
        set_if_some(&mut job.resume_used, patch.resume_used);
        set_if_some(&mut job.notes, patch.notes);
        set_if_some(&mut job.url, patch.url);
        set_if_some(&mut job.salary, patch.salary);
        set_if_some(&mut job.location, patch.location);
        set_if_some(&mut job.contact_person, patch.contact_person);
        if let Some(status) = status {
            job.status = status;
        }
        job.updated_at = self.clock.now();
        let job = job.clone();

        self.store.save_jobs(&jobs).await?;
        info!("Service: Job {} patched", id);
        Ok(job)
    }

    /// Move a job to another column. A missing status is invalid.
    pub async fn update_status(&self, id: u64, status: Option<&str>) -> Result<Job, ServiceError> {
        let status = parse_status(status.unwrap_or_default())?;

        let _guard = self.write_lock.lock().await;
        let mut jobs = self.store.load_jobs().await?;
        let job = jobs
            .iter_mut()
            .find(|job| job.id == id)
            .ok_or(ServiceError::NotFound(id))?;

        let previous = job.status;
        job.status = status;
        job.updated_at = self.clock.now();
        let job = job.clone();

        self.store.save_jobs(&jobs).await?;
        info!("Service: Job {} moved from {} to {}", id, previous, status);
        Ok(job)
    }

    pub async fn delete_job(&self, id: u64) -> Result<(), ServiceError> {
        let _guard = self.write_lock.lock().await;
        let mut jobs = self.store.load_jobs().await?;
        let before = jobs.len();
        jobs.retain(|job| job.id != id);

        if jobs.len() == before {
            return Err(ServiceError::NotFound(id));
        }

        self.store.save_jobs(&jobs).await?;
        info!("Service: Job {} deleted", id);
        Ok(())
    }

    /// Total count plus a count per status present in the collection
    pub async fn stats(&self) -> Result<JobStats, ServiceError> {
        let jobs = self.store.load_jobs().await?;
        let mut by_status = BTreeMap::new();
        for job in &jobs {
            *by_status.entry(job.status).or_insert(0) += 1;
        }

        Ok(JobStats {
            total: jobs.len(),
            by_status,
        })
    }
}
