pub mod health;
pub mod job;
pub mod validation;

use actix_cors::Cors;
use actix_web::http::{header, Method};
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use health::health_config;
use job::{handlers::job_config, JobService};

/// Permissive CORS: any origin, the verbs the board uses, JSON and auth headers
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Routes, extractor configs and shared state of the application
pub fn app_config(
    service: web::Data<JobService>,
    max_payload_size: usize,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |config| {
        config
            .app_data(service)
            .app_data(web::PayloadConfig::default().limit(max_payload_size))
            .app_data(validation::json_config(max_payload_size))
            .app_data(validation::path_config())
            .app_data(validation::query_config())
            .configure(health_config)
            .service(web::scope("/api").configure(job_config));
    }
}

/// Catch-all route. `OPTIONS` anywhere answers 200 with no body.
pub async fn fallback(req: HttpRequest) -> HttpResponse {
    if req.method() == Method::OPTIONS {
        return HttpResponse::Ok().finish();
    }

    HttpResponse::NotFound().json(json!({
        "error": "Not found",
        "path": req.path(),
        "method": req.method().as_str(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::health::HealthResponse;
    use crate::api::job::dto::{JobStats, MessageResponse};
    use crate::api::job::models::JobStatus;
    use crate::api::job::Job;
    use crate::api::validation::ErrorResponse;
    use crate::db::memory::MemoryStore;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};
    use std::sync::Arc;

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .wrap(cors())
                    .configure(app_config(
                        web::Data::new(JobService::new(Arc::new(MemoryStore::new()))),
                        1024 * 1024,
                    ))
                    .default_service(web::route().to(fallback)),
            )
            .await
        };
    }

    macro_rules! create {
        ($app:expr, $body:expr) => {{
            let req = test::TestRequest::post()
                .uri("/api/jobs")
                .set_json($body)
                .to_request();
            let resp = test::call_service(&$app, req).await;
            assert_eq!(resp.status(), StatusCode::CREATED);
            let job: Job = test::read_body_json(resp).await;
            job
        }};
    }

    #[actix_web::test]
    async fn create_patch_delete_roundtrip() {
        let app = app!();

        let job = create!(app, json!({ "company": "Acme", "position": "Engineer" }));
        assert_eq!(job.id, 1);
        assert_eq!(job.status, JobStatus::Applied);

        let req = test::TestRequest::patch()
            .uri("/api/jobs/1/status")
            .set_json(json!({ "status": "interview" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let moved: Job = test::read_body_json(resp).await;
        assert_eq!(moved.status, JobStatus::Interview);
        assert!(moved.updated_at > job.updated_at);

        let req = test::TestRequest::delete().uri("/api/jobs/1").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: MessageResponse = test::read_body_json(resp).await;
        assert_eq!(body.message, "Job deleted successfully");

        let req = test::TestRequest::get().uri("/api/jobs/1").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "Job not found");
    }

    #[actix_web::test]
    async fn create_without_required_fields_is_rejected() {
        let app = app!();

        for body in [
            json!({ "position": "Engineer" }),
            json!({ "company": "Acme" }),
            json!({ "company": "", "position": "Engineer" }),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/jobs")
                .set_json(body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body: ErrorResponse = test::read_body_json(resp).await;
            assert_eq!(body.error, "Company and position are required");
        }

        let req = test::TestRequest::get().uri("/api/jobs").to_request();
        let jobs: Vec<Job> = test::call_and_read_body_json(&app, req).await;
        assert!(jobs.is_empty());
    }

    #[actix_web::test]
    async fn malformed_json_is_a_bad_request() {
        let app = app!();

        let req = test::TestRequest::post()
            .uri("/api/jobs")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{ company: ")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }

    #[actix_web::test]
    async fn list_puts_recently_updated_first() {
        let app = app!();
        let first = create!(app, json!({ "company": "First", "position": "Dev" }));
        let second = create!(app, json!({ "company": "Second", "position": "Dev" }));

        let req = test::TestRequest::patch()
            .uri(&format!("/api/jobs/{}", first.id))
            .set_json(json!({ "notes": "followed up" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/api/jobs").to_request();
        let jobs: Vec<Job> = test::call_and_read_body_json(&app, req).await;
        let ids: Vec<u64> = jobs.iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert_eq!(jobs[0].notes, "followed up");
    }

    #[actix_web::test]
    async fn list_supports_search_query() {
        let app = app!();
        create!(app, json!({ "company": "Acme", "position": "Dev", "location": "Lisbon" }));
        create!(app, json!({ "company": "Globex", "position": "Dev" }));

        let req = test::TestRequest::get().uri("/api/jobs?q=lisbon").to_request();
        let jobs: Vec<Job> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].company, "Acme");
    }

    #[actix_web::test]
    async fn invalid_status_patch_is_rejected_and_job_untouched() {
        let app = app!();
        let job = create!(app, json!({ "company": "Acme", "position": "Engineer" }));

        for uri in ["/api/jobs/1", "/api/jobs/1/status"] {
            let req = test::TestRequest::patch()
                .uri(uri)
                .set_json(json!({ "status": "hired" }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body: ErrorResponse = test::read_body_json(resp).await;
            assert_eq!(body.error, "Invalid status");
        }

        let req = test::TestRequest::get().uri("/api/jobs/1").to_request();
        let current: Job = test::call_and_read_body_json(&app, req).await;
        assert_eq!(current.status, job.status);
        assert_eq!(current.updated_at, job.updated_at);
    }

    #[actix_web::test]
    async fn put_replaces_job_and_404s_for_unknown_id() {
        let app = app!();
        create!(app, json!({ "company": "Acme", "position": "Engineer", "notes": "hi" }));

        let req = test::TestRequest::put()
            .uri("/api/jobs/1")
            .set_json(json!({ "company": "Acme", "position": "Lead", "status": "offer" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let job: Job = test::read_body_json(resp).await;
        assert_eq!(job.position, "Lead");
        assert_eq!(job.status, JobStatus::Offer);
        assert_eq!(job.notes, "");

        let req = test::TestRequest::put()
            .uri("/api/jobs/2")
            .set_json(json!({ "company": "Acme", "position": "Lead" }))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[actix_web::test]
    async fn delete_unknown_job_is_not_found() {
        let app = app!();
        create!(app, json!({ "company": "Acme", "position": "Engineer" }));

        let req = test::TestRequest::delete().uri("/api/jobs/7").to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );

        let req = test::TestRequest::get().uri("/api/jobs").to_request();
        let jobs: Vec<Job> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(jobs.len(), 1);
    }

    #[actix_web::test]
    async fn stats_omit_empty_statuses() {
        let app = app!();
        for status in ["applied", "applied", "offer"] {
            create!(app, json!({ "company": "Acme", "position": "Engineer", "status": status }));
        }

        let req = test::TestRequest::get().uri("/api/stats").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "total": 3, "byStatus": { "applied": 2, "offer": 1 } }));

        let req = test::TestRequest::get().uri("/api/stats").to_request();
        let stats: JobStats = test::call_and_read_body_json(&app, req).await;
        assert_eq!(stats.total, 3);
    }

    #[actix_web::test]
    async fn non_numeric_id_is_not_found() {
        let app = app!();
        let req = test::TestRequest::get().uri("/api/jobs/abc").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "Job not found");
    }

    #[actix_web::test]
    async fn unknown_route_reports_path_and_method() {
        let app = app!();
        let req = test::TestRequest::get().uri("/api/nope").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({ "error": "Not found", "path": "/api/nope", "method": "GET" })
        );
    }

    #[actix_web::test]
    async fn preflight_is_answered_with_cors_headers() {
        let app = app!();
        let req = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/api/jobs")
            .insert_header((header::ORIGIN, "http://localhost:5173"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "PATCH"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }

    #[actix_web::test]
    async fn options_without_origin_is_empty_ok() {
        let app = app!();
        create!(app, json!({ "company": "Acme", "position": "Engineer" }));

        for uri in ["/api/jobs/1", "/api/jobs", "/api/nope"] {
            let req = test::TestRequest::default()
                .method(Method::OPTIONS)
                .uri(uri)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            assert!(test::read_body(resp).await.is_empty());
        }
    }

    #[actix_web::test]
    async fn patch_cannot_blank_company_or_position() {
        let app = app!();
        let job = create!(app, json!({ "company": "Acme", "position": "Engineer" }));

        let req = test::TestRequest::patch()
            .uri("/api/jobs/1")
            .set_json(json!({ "company": "", "position": "" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "Company and position are required");

        let req = test::TestRequest::get().uri("/api/jobs/1").to_request();
        let current: Job = test::call_and_read_body_json(&app, req).await;
        assert_eq!(current, job);
    }

    #[actix_web::test]
    async fn health_reports_backend() {
        let app = app!();
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: HealthResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.status, "healthy");
        assert_eq!(body.storage, "memory");
    }
}
