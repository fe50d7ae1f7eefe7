use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use ufc_data::store::StoreError;
use ufc_data::{
    AppConfig, DocStore, Fighter, FighterFilter, FighterUpdate, NewFighter, RefreshScope,
    ServiceError, UfcService,
};

type AppState = Arc<UfcService>;

/// JSON error envelope: `{"success": false, "message": ...}` with the
/// mapped status code.
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let status = match &err {
            ServiceError::ScrapingDisabled => StatusCode::FORBIDDEN,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyExists(_) => Self::bad_request(err.to_string()),
            other => Self::new(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "success": false, "message": self.message });
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FighterQuery {
    weight_class: Option<String>,
    country: Option<String>,
    q: Option<String>,
}

async fn list_fighters(
    State(service): State<AppState>,
    Query(query): Query<FighterQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let filter = FighterFilter {
        weight_class: query.weight_class,
        country: query.country,
        q: query.q,
    };
    let fighters = service.store().list_fighters(&filter).await;
    Ok(Json(json!({
        "success": true,
        "count": fighters.len(),
        "fighters": fighters,
    })))
}

async fn create_fighter(
    State(service): State<AppState>,
    Json(body): Json<NewFighter>,
) -> Result<impl IntoResponse, ApiError> {
    let external_id = require(body.external_id, "externalId")?;
    let name = require(body.name, "name")?;
    let weight_class = require(body.weight_class, "weightClass")?;

    let now = Utc::now();
    let fighter = Fighter {
        external_id,
        name,
        weight_class,
        country: body.country,
        wins: body.wins.unwrap_or(0),
        losses: body.losses.unwrap_or(0),
        draws: body.draws.unwrap_or(0),
        nickname: body.nickname,
        status: body.status,
        image_url: body.image_url,
        created_at: now,
        updated_at: now,
    };

    let created = service.store().insert_fighter(fighter).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "fighter": created })),
    ))
}

fn require(field: Option<String>, name: &str) -> Result<String, ApiError> {
    field
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("{name} is required")))
}

async fn sync_fighters(
    State(service): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let count = service.sync_fighters().await?;
    Ok(Json(json!({ "success": true, "count": count })))
}

async fn get_fighter(
    State(service): State<AppState>,
    Path(external_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let fighter = service
        .store()
        .find_fighter_by_slug(&external_id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("fighter \"{external_id}\" not found")))?;
    Ok(Json(json!({ "success": true, "fighter": fighter })))
}

async fn update_fighter(
    State(service): State<AppState>,
    Path(external_id): Path<String>,
    Json(update): Json<FighterUpdate>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let fighter = service
        .store()
        .update_fighter(&external_id, update)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("fighter \"{external_id}\" not found")))?;
    Ok(Json(json!({ "success": true, "fighter": fighter })))
}

async fn delete_fighter(
    State(service): State<AppState>,
    Path(external_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !service.store().delete_fighter(&external_id).await? {
        return Err(ApiError::not_found(format!(
            "fighter \"{external_id}\" not found"
        )));
    }
    Ok(Json(json!({ "success": true })))
}

async fn refresh_event_list(
    State(service): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let refresh = service.refresh_event_list().await?;
    Ok(Json(json!({
        "success": true,
        "upcomingCount": refresh.upcoming_count,
        "pastCount": refresh.past_count,
        "total": refresh.total,
    })))
}

async fn upcoming_events(
    State(service): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let events = service.store().upcoming_events().await;
    Ok(Json(json!({
        "success": true,
        "count": events.len(),
        "events": events,
    })))
}

async fn past_events(
    State(service): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let events = service.store().past_events(10).await;
    Ok(Json(json!({
        "success": true,
        "count": events.len(),
        "events": events,
    })))
}

async fn get_event(
    State(service): State<AppState>,
    Path(ufc_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let event = service
        .store()
        .get_event(&ufc_id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("event \"{ufc_id}\" not found")))?;
    Ok(Json(json!({ "success": true, "event": event })))
}

async fn refresh_event_details(
    State(service): State<AppState>,
    Path(ufc_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let event = service.refresh_event_details(&ufc_id).await?;
    Ok(Json(json!({ "success": true, "event": event })))
}

async fn refresh_all_details(
    State(service): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let report = service.bulk_refresh_details(RefreshScope::All).await?;
    Ok(Json(json!({ "success": true, "report": report })))
}

async fn refresh_past_details(
    State(service): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let report = service.bulk_refresh_details(RefreshScope::Past).await?;
    Ok(Json(json!({ "success": true, "report": report })))
}

async fn get_rankings(
    State(service): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    match service.store().rankings().await {
        Some(snapshot) => Ok(Json(json!({
            "success": true,
            "source": "store",
            "updatedAt": snapshot.last_refreshed_at,
            "divisions": snapshot.divisions,
        }))),
        None => Ok(Json(json!({
            "success": true,
            "source": "store",
            "updatedAt": null,
            "divisions": [],
        }))),
    }
}

async fn get_division(
    State(service): State<AppState>,
    Path(division): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let found = service
        .store()
        .find_division(&division)
        .await
        .ok_or_else(|| ApiError::not_found(format!("division \"{division}\" not found")))?;
    Ok(Json(json!({ "success": true, "division": found })))
}

async fn refresh_rankings(
    State(service): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let snapshot = service.refresh_rankings().await?;
    Ok(Json(json!({
        "success": true,
        "updatedAt": snapshot.last_refreshed_at,
        "divisions": snapshot.divisions,
    })))
}

fn router(service: AppState) -> Router {
    Router::new()
        .route("/fighters", get(list_fighters).post(create_fighter))
        .route("/fighters/sync", post(sync_fighters))
        .route(
            "/fighters/:external_id",
            get(get_fighter)
                .put(update_fighter)
                .patch(update_fighter)
                .delete(delete_fighter),
        )
        .route("/ufc/events/refresh", post(refresh_event_list))
        .route("/ufc/events/upcoming", get(upcoming_events))
        .route("/ufc/events/past", get(past_events))
        .route("/ufc/events/refresh-all", post(refresh_all_details))
        .route("/ufc/events/refresh-past", post(refresh_past_details))
        .route("/ufc/events/:ufc_id", get(get_event))
        .route(
            "/ufc/events/:ufc_id/refresh-details",
            post(refresh_event_details),
        )
        .route("/ufc/rankings", get(get_rankings))
        .route("/ufc/rankings/refresh", post(refresh_rankings))
        .route("/ufc/rankings/:division", get(get_division))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    let store = Arc::new(
        DocStore::open(&config.data_file).with_context(|| {
            format!("Failed to open data file {}", config.data_file.display())
        })?,
    );
    let service = Arc::new(UfcService::new(&config, store));

    let app = router(service);
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    println!("UFC data server running on http://{}", addr);
    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
