use super::DashboardAppState;
use actix_web::{web, HttpResponse, Responder};
use shared_types::{HealthResponse, SourceStatus};
use std::path::Path;

fn source_status(path: &Path) -> SourceStatus {
    SourceStatus {
        path: path.display().to_string(),
        exists: path.is_file(),
    }
}

/// 200 while every configured source file exists, 503 otherwise.
pub async fn health(state: web::Data<DashboardAppState>) -> impl Responder {
    let data = state.sources.data();
    let response = HealthResponse {
        status: "healthy".to_string(),
        merged: source_status(&data.merged_path),
        calls: source_status(&data.calls_path),
        orders: source_status(&data.orders_path),
    };

    if response.merged.exists && response.calls.exists && response.orders.exists {
        HttpResponse::Ok().json(response)
    } else {
        tracing::warn!("Health check failed: a source file is missing");
        HttpResponse::ServiceUnavailable().json(HealthResponse {
            status: "unhealthy".to_string(),
            ..response
        })
    }
}
