use super::{with_sources, DashboardAppState};
use actix_web::{web, HttpResponse, Result as ActixResult};
use shared_types::EmailMatchResponse;

/// Orders whose contact email matches a call email, over the full tables.
///
/// Kept apart from the metric cards, which count purchases from `order_number`.
pub async fn email_matched_purchases(
    state: web::Data<DashboardAppState>,
) -> ActixResult<HttpResponse> {
    let matched_purchases = with_sources(&state, |sources| {
        let calls = sources.calls()?;
        let orders = sources.orders()?;
        Ok(loaders::email_matched_purchases(
            &calls.records,
            &orders.records,
        ))
    })
    .await?;

    Ok(HttpResponse::Ok().json(EmailMatchResponse { matched_purchases }))
}
