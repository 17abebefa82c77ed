use super::{with_sources, DashboardAppState};
use crate::helpers::range_query::RangeQuery;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse, Result as ActixResult};
use loaders::{export_merged, filter_by_date, observed_range, resolve_range, EXPORT_FILE_NAME};
use tracing::info;

/// The merged table restricted to the requested range, as a CSV download.
pub async fn export_filtered(
    state: web::Data<DashboardAppState>,
    query: web::Query<RangeQuery>,
) -> ActixResult<HttpResponse> {
    let (start, end) = query
        .bounds()
        .map_err(|e| actix_web::error::ErrorBadRequest(e.to_string()))?;

    let (body, rows) = with_sources(&state, move |sources| {
        let merged = sources.merged()?;
        let observed = observed_range(&merged.records);
        let range = resolve_range(start, end, observed.as_ref());
        let rows = filter_by_date(&merged.records, range.as_ref());
        let body = export_merged(sources.loader().csv_parser(), &merged, &rows)?;
        Ok((body, rows.len()))
    })
    .await?;

    info!("Exported {} filtered rows ({} bytes)", rows, body.len());

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(EXPORT_FILE_NAME.to_string())],
        })
        .body(body))
}
