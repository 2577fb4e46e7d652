use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

pub mod clamp;
mod payload;

pub use payload::{
    AnnuityPayload, ApiFrequency, ApiGoalType, ApiHeartRateFormula, ApiInflationSource,
    ApiPresentValueMode, ApiTiming, Calculation, CompoundPayload, GoalPayload, HeartRatePayload,
    InflationPayload, PresentValuePayload, ProjectionPayload, RecurringDepositPayload,
};

use crate::error::{Error, Result};

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub fn router() -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route(
            "/api/compound",
            get(calculate_get::<CompoundPayload>).post(calculate_post::<CompoundPayload>),
        )
        .route(
            "/api/recurring-deposit",
            get(calculate_get::<RecurringDepositPayload>)
                .post(calculate_post::<RecurringDepositPayload>),
        )
        .route(
            "/api/annuity",
            get(calculate_get::<AnnuityPayload>).post(calculate_post::<AnnuityPayload>),
        )
        .route(
            "/api/present-value",
            get(calculate_get::<PresentValuePayload>).post(calculate_post::<PresentValuePayload>),
        )
        .route(
            "/api/inflation",
            get(calculate_get::<InflationPayload>).post(calculate_post::<InflationPayload>),
        )
        .route(
            "/api/projection",
            get(calculate_get::<ProjectionPayload>).post(calculate_post::<ProjectionPayload>),
        )
        .route(
            "/api/goal",
            get(calculate_get::<GoalPayload>).post(calculate_post::<GoalPayload>),
        )
        .route(
            "/api/heart-rate",
            get(calculate_get::<HeartRatePayload>).post(calculate_post::<HeartRatePayload>),
        )
        .fallback(not_found_handler)
}

pub async fn run_http_server(addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    info!(%local, "calculator HTTP API listening");

    axum::serve(listener, router()).await?;
    Ok(())
}

pub fn render_json<C: Calculation>(payload: C) -> Result<String> {
    let output = payload.run()?;
    Ok(serde_json::to_string_pretty(&output)?)
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn calculate_get<C>(Query(payload): Query<C>) -> Response
where
    C: Calculation + DeserializeOwned + Send + 'static,
{
    calculate(payload)
}

async fn calculate_post<C>(Json(payload): Json<C>) -> Response
where
    C: Calculation + DeserializeOwned + Send + 'static,
{
    calculate(payload)
}

fn calculate<C: Calculation>(payload: C) -> Response {
    match payload.run() {
        Ok(output) => {
            debug!(calculator = C::NAME, "calculation complete");
            json_response(StatusCode::OK, output)
        }
        Err(Error::InvalidInput(msg)) => {
            warn!(calculator = C::NAME, %msg, "rejected calculator input");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
        Err(err) => {
            warn!(calculator = C::NAME, %err, "calculation failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
