use actix_web::{
    delete, get, patch, post, put,
    web::{Data, Path, Query, ServiceConfig},
    HttpResponse, Responder,
};
use actix_web_validator::Json;

use super::dto::{JobInput, JobPatch, ListQuery, MessageResponse, StatusUpdate};
use super::service::{JobService, ServiceError};

#[get("/jobs")]
async fn list_jobs(
    service: Data<JobService>,
    query: Query<ListQuery>,
) -> Result<impl Responder, ServiceError> {
    let jobs = service.list_jobs(query.q.as_deref()).await?;
    Ok(HttpResponse::Ok().json(jobs))
}

#[post("/jobs")]
async fn create_job(
    service: Data<JobService>,
    job: Json<JobInput>,
) -> Result<impl Responder, ServiceError> {
    let job = service.create_job(job.into_inner()).await?;
    Ok(HttpResponse::Created().json(job))
}

#[get("/jobs/{id}")]
async fn get_job(
    service: Data<JobService>,
    id: Path<u64>,
) -> Result<impl Responder, ServiceError> {
    let job = service.get_job(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(job))
}

#[put("/jobs/{id}")]
async fn replace_job(
    service: Data<JobService>,
    id: Path<u64>,
    job: Json<JobInput>,
) -> Result<impl Responder, ServiceError> {
    let job = service.replace_job(id.into_inner(), job.into_inner()).await?;
    Ok(HttpResponse::Ok().json(job))
}

#[patch("/jobs/{id}")]
async fn patch_job(
    service: Data<JobService>,
    id: Path<u64>,
    patch: Json<JobPatch>,
) -> Result<impl Responder, ServiceError> {
    let job = service.patch_job(id.into_inner(), patch.into_inner()).await?;
    Ok(HttpResponse::Ok().json(job))
}

#[patch("/jobs/{id}/status")]
async fn update_status(
    service: Data<JobService>,
    id: Path<u64>,
    body: Json<StatusUpdate>,
) -> Result<impl Responder, ServiceError> {
    let job = service
        .update_status(id.into_inner(), body.status.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(job))
}

#[delete("/jobs/{id}")]
async fn delete_job(
    service: Data<JobService>,
    id: Path<u64>,
) -> Result<impl Responder, ServiceError> {
    service.delete_job(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Job deleted successfully".to_string(),
    }))
}

#[get("/stats")]
async fn stats(service: Data<JobService>) -> Result<impl Responder, ServiceError> {
    Ok(HttpResponse::Ok().json(service.stats().await?))
}

/// Job routes, mounted under `/api`
pub fn job_config(config: &mut ServiceConfig) {
    config
        .service(list_jobs)
        .service(create_job)
        .service(get_job)
        .service(replace_job)
        .service(patch_job)
        .service(update_status)
        .service(delete_job)
        .service(stats);
}
