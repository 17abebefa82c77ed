pub mod dashboard;
pub mod export;
pub mod health;
pub mod purchases;

use crate::helpers::source_cache::SourceCache;
use actix_web::{web, Result as ActixResult};
use shared_types::SourceError;
use std::sync::Arc;
use tracing::error;

#[derive(Clone)]
pub struct DashboardAppState {
    pub sources: Arc<SourceCache>,
}

/// Runs `work` against the sources on the blocking pool.
///
/// A source failure fails the whole response; nothing partial is returned.
pub(crate) async fn with_sources<T, F>(state: &DashboardAppState, work: F) -> ActixResult<T>
where
    F: FnOnce(&SourceCache) -> Result<T, SourceError> + Send + 'static,
    T: Send + 'static,
{
    let sources = state.sources.clone();

    web::block(move || work(sources.as_ref()))
        .await
        .map_err(|e| actix_web::error::ErrorInternalServerError(e.to_string()))?
        .map_err(|e| {
            error!("Failed to read dashboard sources: {}", e);
            actix_web::error::ErrorInternalServerError(e.to_string())
        })
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health))
        .route("/", web::get().to(dashboard::index))
        .route("/api/dashboard", web::get().to(dashboard::get_snapshot))
        .route("/api/export", web::get().to(export::export_filtered))
        .route(
            "/api/purchases/email-matched",
            web::get().to(purchases::email_matched_purchases),
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DataConfig;
    use actix_web::{test, App};
    use shared_types::{DashboardSnapshot, EmailMatchResponse, HealthResponse};
    use std::path::Path;

    const MERGED: &str = "\
StartTimestamp,UserSentiment,DisconnectionReason,DurationSeconds,CallSuccessful,order_number
2024-01-01 09:00:00,Positive,user_hangup,120,1,#1001
2024-01-01 10:00:00,Neutral,agent_hangup,30,0,
2024-01-02 11:00:00,Positive,user_hangup,60,1,#1002
2024-01-03 12:00:00,Negative,voicemail,5,0,
not-a-date,Negative,voicemail,5,0,#1003
";

    const CALLS: &str = "\
StartTimestamp,TotalDuration (in sec),Email
2024-01-01 09:00:00,120,Buyer@Shop.com
2024-01-01 10:00:00,30,someone@else.com
2024-01-02 11:00:00,60,second@shop.com
2024-01-03 12:00:00,1,
2024-01-03 12:30:00,n/a,late@shop.com
";

    const ORDERS: &str = "\
order_id,contact_email
1,buyer@shop.com
2,SECOND@shop.com
3,stranger@shop.com
";

    fn fixture(dir: &Path) -> DashboardAppState {
        let data = DataConfig::in_dir(dir);
        std::fs::write(&data.merged_path, MERGED).unwrap();
        std::fs::write(&data.calls_path, CALLS).unwrap();
        std::fs::write(&data.orders_path, ORDERS).unwrap();

        DashboardAppState {
            sources: Arc::new(SourceCache::new(data, b',')),
        }
    }

    #[actix_web::test]
    async fn test_snapshot_defaults_to_observed_range() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(fixture(dir.path())))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/dashboard").to_request();
        let snapshot: DashboardSnapshot = test::call_and_read_body_json(&app, req).await;

        assert_eq!(snapshot.metrics.total_calls, 4);
        assert_eq!(snapshot.metrics.picked_up_calls, 3);
        assert_eq!(snapshot.metrics.purchases_after_calls, 2);
        assert_eq!(snapshot.metrics.conversion_percentage, 66.67);
        assert_eq!(snapshot.duration_histogram.len(), 20);
        assert_eq!(snapshot.sentiment[0].label, "Positive");
    }

    #[actix_web::test]
    async fn test_health_reports_sources() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(fixture(dir.path())))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);

        let health: HealthResponse = test::read_body_json(resp).await;
        assert_eq!(health.status, "healthy");
        assert!(health.merged.exists && health.calls.exists && health.orders.exists);
        assert!(health.orders.path.ends_with("shopify_orders.csv"));
    }

    #[actix_web::test]
    async fn test_health_is_unavailable_without_a_source() {
        let dir = tempfile::tempdir().unwrap();
        let state = fixture(dir.path());
        std::fs::remove_file(&state.sources.data().orders_path).unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.status(),
            actix_web::http::StatusCode::SERVICE_UNAVAILABLE
        );

        let health: HealthResponse = test::read_body_json(resp).await;
        assert_eq!(health.status, "unhealthy");
        assert!(health.merged.exists);
        assert!(!health.orders.exists);
    }

    #[actix_web::test]
    async fn test_snapshot_respects_requested_range() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(fixture(dir.path())))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/dashboard?start_date=2024-01-02&end_date=2024-01-03")
            .to_request();
        let snapshot: DashboardSnapshot = test::call_and_read_body_json(&app, req).await;

        assert_eq!(snapshot.metrics.total_calls, 2);
        assert_eq!(snapshot.metrics.picked_up_calls, 1);
        assert_eq!(snapshot.metrics.purchases_after_calls, 1);
        assert_eq!(snapshot.metrics.conversion_percentage, 100.0);
    }

    #[actix_web::test]
    async fn test_bad_date_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(fixture(dir.path())))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/dashboard?start_date=yesterday")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_missing_source_fails_the_render() {
        let dir = tempfile::tempdir().unwrap();
        let state = fixture(dir.path());
        std::fs::remove_file(&state.sources.data().calls_path).unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.status(),
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn test_index_renders_page() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(fixture(dir.path())))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/").to_request();
        let body = test::call_and_read_body(&app, req).await;
        let html = String::from_utf8(body.to_vec()).unwrap();

        assert!(html.contains("Total Calls Made"));
        assert!(html.contains("66.67%"));
        assert_eq!(html.matches("<svg").count(), 5);
    }

    #[actix_web::test]
    async fn test_export_downloads_filtered_csv() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(fixture(dir.path())))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/export?start_date=2024-01-01&end_date=2024-01-01")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let disposition = resp
            .headers()
            .get(actix_web::http::header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("filtered_data.csv"));

        let body = test::read_body(resp).await;
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().next().unwrap().ends_with(",call_date"));
    }

    #[actix_web::test]
    async fn test_email_matched_purchases() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(fixture(dir.path())))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/purchases/email-matched")
            .to_request();
        let resp: EmailMatchResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp.matched_purchases, 2);
    }
}
