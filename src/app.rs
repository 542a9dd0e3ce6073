//! Active routes of the analytics API

use crate::app_state::{AppState, SharedAppState};
use crate::cli::CommandLineArgs;
use crate::error::AnalyticsError;
use crate::metrics;
use crate::models::AggregationParams;
use crate::operation::Aggregation;
use crate::operations;
use crate::validated_query::ValidatedQuery;

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use tower::Layer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::normalize_path::NormalizePathLayer;
use tower_http::trace::TraceLayer;

/// Text returned by the root endpoint.
const WELCOME: &str = "Welcome to the Sales Analytics API";

/// Returns a [axum::Router] with all API routes.
///
/// # Arguments
///
/// * `state`: Shared application state
fn router(state: SharedAppState) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route(
            "/sales_over_time",
            get(interval_aggregation_handler::<operations::SalesOverTime>),
        )
        .route(
            "/new_customers",
            get(interval_aggregation_handler::<operations::NewCustomersOverTime>),
        )
        .route(
            "/repeat_customers",
            get(interval_aggregation_handler::<operations::RepeatCustomersOverTime>),
        )
        .route(
            "/customer_distribution",
            get(aggregation_handler::<operations::CustomerDistribution>),
        )
        .route("/clv_by_cohorts", get(aggregation_handler::<operations::ClvByCohorts>))
        .route("/metrics", get(metrics::metrics_handler))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .on_request(metrics::request_counter)
                        .on_response(metrics::record_response_metrics),
                )
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}

/// Service type of the analytics API.
pub type Service = tower_http::normalize_path::NormalizePath<Router>;

/// Returns a [crate::app::Service] serving the given state.
///
/// The router is wrapped in a layer that trims trailing slashes from request paths.
fn build(state: SharedAppState) -> Service {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}

/// Returns a [crate::app::Service] with all routes and middleware.
///
/// # Arguments
///
/// * `args`: Command line arguments
pub fn service(args: &CommandLineArgs) -> Service {
    build(Arc::new(AppState::new(args)))
}

async fn welcome() -> &'static str {
    WELCOME
}

/// Handler for aggregations bucketed by interval.
///
/// The `interval` and `growth` query parameters are validated before any data is read.
async fn interval_aggregation_handler<A: Aggregation>(
    State(state): State<SharedAppState>,
    ValidatedQuery(params): ValidatedQuery<AggregationParams>,
) -> Result<Json<Vec<A::Row>>, AnalyticsError> {
    aggregate::<A>(&state, params).await
}

/// Handler for aggregations without parameters. Query parameters are ignored.
async fn aggregation_handler<A: Aggregation>(
    State(state): State<SharedAppState>,
) -> Result<Json<Vec<A::Row>>, AnalyticsError> {
    aggregate::<A>(&state, AggregationParams::default()).await
}

/// Load the aggregation's dataset and aggregate it.
#[tracing::instrument(level = "DEBUG", skip(state))]
async fn aggregate<A: Aggregation>(
    state: &AppState,
    params: AggregationParams,
) -> Result<Json<Vec<A::Row>>, AnalyticsError> {
    let records = state.record_store.load::<A::Record>(A::DATASET).await?;
    let rows = A::execute(&records, &params)?;
    tracing::debug!("aggregated {} records into {} rows", records.len(), rows.len());
    Ok(Json(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::record_store::StoreConfig;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt; // for `oneshot`

    const SALES: &str = r#"[
        {"sale_id": 1, "user_id": 1, "sale_date": "2024-01-05", "total_price": 100},
        {"sale_id": 2, "user_id": 2, "sale_date": "2024-01-20", "total_price": 50}
    ]"#;

    const USERS: &str = r#"[
        {"user_id": 1, "created_at": "2023-12-30"},
        {"user_id": 2, "created_at": "2024-01-02T09:30:00"},
        {"user_id": 3, "created_at": "2024-01-17"}
    ]"#;

    const CUSTOMERS: &str = r#"[
        {"customer_id": 1, "city": "Bristol", "latitude": 51.45, "longitude": -2.58},
        {"customer_id": 2, "city": "Bristol", "latitude": 51.5, "longitude": -2.6}
    ]"#;

    fn data_dir(files: &[(&str, &str)]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, contents) in files {
            std::fs::write(dir.path().join(name), contents).unwrap();
        }
        dir
    }

    fn full_data_dir() -> TempDir {
        data_dir(&[
            ("sales.json", SALES),
            ("users.json", USERS),
            ("customers.json", CUSTOMERS),
        ])
    }

    async fn request(dir: &TempDir, uri: &str) -> Response {
        let state = Arc::new(AppState::with_store_config(StoreConfig::new(dir.path())));
        build(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    // Jump through the hoops to get the body as a string.
    async fn body_string(response: Response) -> String {
        String::from_utf8(
            hyper::body::to_bytes(response.into_body())
                .await
                .unwrap()
                .to_vec(),
        )
        .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_str(&body_string(response).await).unwrap()
    }

    #[tokio::test]
    async fn welcome_text() {
        let response = request(&full_data_dir(), "/").await;
        assert_eq!(StatusCode::OK, response.status());
        assert_eq!(WELCOME, body_string(response).await);
    }

    #[tokio::test]
    async fn sales_over_time_default_daily() {
        let response = request(&full_data_dir(), "/sales_over_time").await;
        assert_eq!(StatusCode::OK, response.status());
        assert_eq!(
            json!([
                {"date": "2024-01-05", "totalSales": 100.0},
                {"date": "2024-01-20", "totalSales": 50.0}
            ]),
            body_json(response).await
        );
    }

    #[tokio::test]
    async fn sales_over_time_monthly() {
        let response = request(&full_data_dir(), "/sales_over_time?interval=monthly").await;
        assert_eq!(StatusCode::OK, response.status());
        assert_eq!(
            json!([{"date": "2024-01", "totalSales": 150.0}]),
            body_json(response).await
        );
    }

    #[tokio::test]
    async fn sales_over_time_growth() {
        let response = request(
            &full_data_dir(),
            "/sales_over_time?interval=daily&growth=true",
        )
        .await;
        assert_eq!(StatusCode::OK, response.status());
        assert_eq!(
            json!([{"date": "2024-01-20", "growthRate": -50.0}]),
            body_json(response).await
        );
    }

    #[tokio::test]
    async fn sales_over_time_growth_false() {
        let response = request(&full_data_dir(), "/sales_over_time?growth=false").await;
        assert_eq!(StatusCode::OK, response.status());
        let body = body_json(response).await;
        assert_eq!(2, body.as_array().unwrap().len());
        assert_eq!(json!(100.0), body[0]["totalSales"]);
    }

    #[tokio::test]
    async fn new_customers_monthly() {
        let response = request(&full_data_dir(), "/new_customers?interval=monthly").await;
        assert_eq!(StatusCode::OK, response.status());
        assert_eq!(
            json!([
                {"date": "2023-12", "newCustomers": 1},
                {"date": "2024-01", "newCustomers": 2}
            ]),
            body_json(response).await
        );
    }

    #[tokio::test]
    async fn repeat_customers_yearly() {
        let response = request(&full_data_dir(), "/repeat_customers?interval=yearly").await;
        assert_eq!(StatusCode::OK, response.status());
        assert_eq!(
            json!([{"date": "2024", "repeatCustomers": 2}]),
            body_json(response).await
        );
    }

    #[tokio::test]
    async fn customer_distribution() {
        let response = request(&full_data_dir(), "/customer_distribution").await;
        assert_eq!(StatusCode::OK, response.status());
        assert_eq!(
            json!([{"city": "Bristol", "latitude": 51.45, "longitude": -2.58, "count": 2}]),
            body_json(response).await
        );
    }

    #[tokio::test]
    async fn clv_by_cohorts() {
        let response = request(&full_data_dir(), "/clv_by_cohorts").await;
        assert_eq!(StatusCode::OK, response.status());
        assert_eq!(
            json!([{"month": "2024-01", "lifetimeValue": 150.0}]),
            body_json(response).await
        );
    }

    #[tokio::test]
    async fn invalid_interval() {
        let dir = full_data_dir();
        for path in ["/sales_over_time", "/new_customers", "/repeat_customers"] {
            let response = request(&dir, &format!("{path}?interval=weekly")).await;
            assert_eq!(StatusCode::BAD_REQUEST, response.status(), "{path}");
            assert_eq!(
                r#"{"error":"Invalid interval"}"#,
                body_string(response).await,
                "{path}"
            );
        }
    }

    #[tokio::test]
    async fn repeated_interval_first_wins() {
        let response = request(
            &full_data_dir(),
            "/sales_over_time?interval=monthly&interval=weekly",
        )
        .await;
        assert_eq!(StatusCode::OK, response.status());
        assert_eq!(
            json!([{"date": "2024-01", "totalSales": 150.0}]),
            body_json(response).await
        );
    }

    #[tokio::test]
    async fn whole_prices_render_as_floats() {
        let response = request(&full_data_dir(), "/clv_by_cohorts").await;
        assert_eq!(StatusCode::OK, response.status());
        assert_eq!(
            r#"[{"month":"2024-01","lifetimeValue":150.0}]"#,
            body_string(response).await
        );
    }

    #[tokio::test]
    async fn customer_distribution_ignores_ids() {
        let customers = r#"[
            {"customer_id": 5, "user_id": 9, "city": "Leeds", "latitude": 53.8, "longitude": -1.55},
            {"customer_id": {"ref": 6}, "user_id": 1.5, "city": "Leeds", "latitude": 53.9, "longitude": -1.5}
        ]"#;
        let dir = data_dir(&[("customers.json", customers)]);
        let response = request(&dir, "/customer_distribution").await;
        assert_eq!(StatusCode::OK, response.status());
        assert_eq!(
            json!([{"city": "Leeds", "latitude": 53.8, "longitude": -1.55, "count": 2}]),
            body_json(response).await
        );
    }

    #[tokio::test]
    async fn interval_ignored_without_interval() {
        let dir = full_data_dir();
        for path in ["/customer_distribution", "/clv_by_cohorts"] {
            let response = request(&dir, &format!("{path}?interval=weekly")).await;
            assert_eq!(StatusCode::OK, response.status(), "{path}");
        }
    }

    #[tokio::test]
    async fn missing_datasets() {
        let dir = data_dir(&[]);
        for path in [
            "/sales_over_time",
            "/sales_over_time?growth=1",
            "/new_customers",
            "/repeat_customers",
            "/customer_distribution",
            "/clv_by_cohorts",
        ] {
            let response = request(&dir, path).await;
            assert_eq!(StatusCode::OK, response.status(), "{path}");
            assert_eq!(json!([]), body_json(response).await, "{path}");
        }
    }

    #[tokio::test]
    async fn empty_datasets() {
        let dir = data_dir(&[
            ("sales.json", "[]"),
            ("users.json", "[]"),
            ("customers.json", "[]"),
        ]);
        for path in [
            "/sales_over_time?interval=quarterly",
            "/new_customers?interval=yearly",
            "/repeat_customers?interval=monthly",
            "/customer_distribution",
            "/clv_by_cohorts",
        ] {
            let response = request(&dir, path).await;
            assert_eq!(StatusCode::OK, response.status(), "{path}");
            assert_eq!(json!([]), body_json(response).await, "{path}");
        }
    }

    #[tokio::test]
    async fn malformed_dataset() {
        let dir = data_dir(&[("sales.json", r#"[{"sale_id": 1}]"#)]);
        let response = request(&dir, "/clv_by_cohorts").await;
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
        let body = body_json(response).await;
        assert_eq!(json!("failed to parse sales dataset"), body["error"]);
    }

    #[tokio::test]
    async fn invalid_record_date() {
        let users = r#"[{"user_id": 1, "created_at": "30/12/2023"}]"#;
        let dir = data_dir(&[("users.json", users)]);
        let response = request(&dir, "/new_customers").await;
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
        let body = body_json(response).await;
        assert_eq!(json!("invalid record date '30/12/2023'"), body["error"]);
    }

    #[tokio::test]
    async fn trailing_slash() {
        let response = request(&full_data_dir(), "/clv_by_cohorts/").await;
        assert_eq!(StatusCode::OK, response.status());
    }

    #[tokio::test]
    async fn unknown_route() {
        let response = request(&full_data_dir(), "/products").await;
        assert_eq!(StatusCode::NOT_FOUND, response.status());
    }

    #[tokio::test]
    async fn cors_any_origin() {
        let dir = full_data_dir();
        let state = Arc::new(AppState::with_store_config(StoreConfig::new(dir.path())));
        let response = build(state)
            .oneshot(
                Request::builder()
                    .uri("/sales_over_time")
                    .header(header::ORIGIN, "https://dashboard.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(StatusCode::OK, response.status());
        assert_eq!(
            "*",
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN]
        );
    }

    #[tokio::test]
    async fn metrics_endpoint() {
        let response = request(&full_data_dir(), "/metrics").await;
        assert_eq!(StatusCode::OK, response.status());
    }
}
