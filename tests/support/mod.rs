//! A throwaway jobs backend for driving the HTTP store in tests.
//!
//! Routes mirror the real REST API and are served from a [`MemoryJobStore`]
//! on an ephemeral port.

use std::sync::Arc;

use actix_web::dev::ServerHandle;
use actix_web::http::StatusCode;
use actix_web::{
    web::{self, Data, Json, Path, Query, ServiceConfig},
    App, HttpResponse, HttpServer, Responder,
};
use serde::Deserialize;
use serde_json::json;

use job_tracker::api::job::dto::{SearchFilters, SortField};
use job_tracker::api::job::models::{JobCreate, JobStatus, JobUpdate};
use job_tracker::http::{JobStore, MemoryJobStore, StoreError};

#[derive(Deserialize)]
struct SearchQuery {
    company: Option<String>,
    title: Option<String>,
    location: Option<String>,
    status: Option<String>,
    skip: Option<u32>,
    limit: Option<u32>,
    sort_by: Option<String>,
    sort_desc: Option<bool>,
}

fn error_response(err: StoreError) -> HttpResponse {
    match err {
        StoreError::NotFound(_) => HttpResponse::NotFound().json(json!({"detail": "Job not found"})),
        StoreError::Status { status, message } => {
            HttpResponse::build(StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST))
                .json(json!({ "detail": message }))
        }
        other => HttpResponse::ServiceUnavailable().json(json!({ "detail": other.to_string() })),
    }
}

fn respond<T: serde::Serialize>(result: Result<T, StoreError>) -> HttpResponse {
    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(err) => error_response(err),
    }
}

async fn list_jobs(store: Data<MemoryJobStore>) -> impl Responder {
    respond(store.list().await)
}

async fn search_jobs(store: Data<MemoryJobStore>, query: Query<SearchQuery>) -> impl Responder {
    let query = query.into_inner();
    let status = match query.status.as_deref().map(str::parse::<JobStatus>).transpose() {
        Ok(status) => status,
        Err(e) => return HttpResponse::BadRequest().json(json!({ "detail": e.to_string() })),
    };
    let sort_by = match query.sort_by.as_deref().map(str::parse::<SortField>).transpose() {
        Ok(sort_by) => sort_by,
        Err(e) => return HttpResponse::BadRequest().json(json!({ "detail": e })),
    };

    let filters = SearchFilters {
        company: query.company,
        title: query.title,
        location: query.location,
        status,
        skip: query.skip,
        limit: query.limit,
        sort_by,
        sort_desc: query.sort_desc,
    };
    respond(store.search(&filters).await)
}

async fn get_job(store: Data<MemoryJobStore>, path: Path<i64>) -> impl Responder {
    respond(store.get(path.into_inner()).await)
}

async fn create_job(store: Data<MemoryJobStore>, job: Json<JobCreate>) -> impl Responder {
    respond(store.create(&job).await)
}

async fn update_job(
    store: Data<MemoryJobStore>,
    path: Path<i64>,
    job: Json<JobUpdate>,
) -> impl Responder {
    respond(store.update(path.into_inner(), &job).await)
}

async fn delete_job(store: Data<MemoryJobStore>, path: Path<i64>) -> impl Responder {
    match store.delete(path.into_inner()).await {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(err) => error_response(err),
    }
}

async fn create_jobs_batch(store: Data<MemoryJobStore>, jobs: Json<Vec<JobCreate>>) -> impl Responder {
    respond(store.create_batch(&jobs).await)
}

fn job_config(config: &mut ServiceConfig) {
    config.service(
        web::scope("/jobs")
            .route("/", web::get().to(list_jobs))
            .route("/", web::post().to(create_job))
            .route("/search", web::get().to(search_jobs))
            .route("/batch", web::post().to(create_jobs_batch))
            .route("/{id}", web::get().to(get_job))
            .route("/{id}", web::put().to(update_job))
            .route("/{id}", web::delete().to(delete_job)),
    );
}

pub struct TestBackend {
    pub base_url: String,
    pub store: Arc<MemoryJobStore>,
    handle: ServerHandle,
}

impl TestBackend {
    pub async fn start() -> std::io::Result<Self> {
        let store = Arc::new(MemoryJobStore::new());
        let data = Data::from(store.clone());

        let server = HttpServer::new(move || App::new().app_data(data.clone()).configure(job_config))
            .workers(1)
            .bind(("127.0.0.1", 0))?;
        let addr = server.addrs()[0];

        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        Ok(Self {
            base_url: format!("http://{}", addr),
            store,
            handle,
        })
    }

    pub async fn stop(self) {
        self.handle.stop(true).await;
    }
}
