use super::{with_sources, DashboardAppState};
use crate::helpers::range_query::RangeQuery;
use crate::views;
use actix_web::{http::header::ContentType, web, HttpResponse, Result as ActixResult};
use shared_types::DashboardSnapshot;
use tracing::info;

async fn load_snapshot(
    state: &DashboardAppState,
    query: &RangeQuery,
) -> ActixResult<DashboardSnapshot> {
    let (start, end) = query
        .bounds()
        .map_err(|e| actix_web::error::ErrorBadRequest(e.to_string()))?;

    with_sources(state, move |sources| {
        let merged = sources.merged()?;
        let calls = sources.calls()?;
        Ok(loaders::build_snapshot(&merged, &calls, start, end))
    })
    .await
}

pub async fn index(
    state: web::Data<DashboardAppState>,
    query: web::Query<RangeQuery>,
) -> ActixResult<HttpResponse> {
    let snapshot = load_snapshot(&state, &query).await?;

    info!(
        "Rendered dashboard for {:?}: total_calls={}, picked_up={}, purchases={}",
        snapshot.range,
        snapshot.metrics.total_calls,
        snapshot.metrics.picked_up_calls,
        snapshot.metrics.purchases_after_calls
    );

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(views::render_page(&snapshot)))
}

pub async fn get_snapshot(
    state: web::Data<DashboardAppState>,
    query: web::Query<RangeQuery>,
) -> ActixResult<HttpResponse> {
    let snapshot = load_snapshot(&state, &query).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}
