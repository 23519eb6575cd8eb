//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! `db::services` layer or to the weather and advisor services. Reads of
//! farms and crops go through [`AppState::data_source`]; everything that
//! writes, plus buyers and chat, requires the primary store.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use super::error::AppError;
use super::state::AppState;
use crate::db::services as db_services;
use crate::models::{
    Buyer, BuyerId, Chat, Crop, FarmId, FarmRecord, FarmUpdate, NewBuyer, NewFarm, NewMessage,
    NewPurchase, NewReview,
};
use crate::routes::advisor::{
    CropRecommendation, RecommendationRequest, YieldPrediction, YieldRequest,
};
use crate::routes::crops::{AvailabilityEntry, CropSummary, HeatPoint, TopStates, TopStatesQuery};
use crate::routes::farms::FarmQuery;
use crate::routes::system::{HealthResponse, TestResponse, DATABASE_CONNECTED, DATABASE_FALLBACK};
use crate::routes::weather::{ForecastDay, WeatherReport};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Result type for handlers that create a resource.
pub type CreatedResult<T> = Result<(StatusCode, Json<T>), AppError>;

// =============================================================================
// System
// =============================================================================

/// GET /api/test
pub async fn test() -> Json<TestResponse> {
    Json(TestResponse {
        message: "Backend is working!".to_string(),
    })
}

/// GET /api/health
///
/// Always 200; `database` reports whether reads are served live or from the
/// fallback dataset.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let database = if state.primary_healthy().await {
        DATABASE_CONNECTED
    } else {
        DATABASE_FALLBACK
    };

    Ok(Json(HealthResponse {
        status: "OK".to_string(),
        message: "Kisaan Mandi API is running".to_string(),
        timestamp: Utc::now(),
        database: database.to_string(),
    }))
}

// =============================================================================
// Farms
// =============================================================================

/// GET /api/farms
pub async fn list_farms(
    State(state): State<AppState>,
    Query(query): Query<FarmQuery>,
) -> HandlerResult<Vec<FarmRecord>> {
    let filter = query.into_filter().map_err(AppError::BadRequest)?;
    let repo = state.data_source().await;
    Ok(Json(db_services::list_farms(repo.as_ref(), &filter).await?))
}

/// POST /api/farms
pub async fn create_farm(
    State(state): State<AppState>,
    payload: Result<Json<NewFarm>, JsonRejection>,
) -> CreatedResult<FarmRecord> {
    let repo = state.writable().await?;
    let Json(farm) = payload?;
    let created = db_services::create_farm(repo.as_ref(), farm).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/farms/{id}
pub async fn get_farm(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<FarmRecord> {
    let repo = state.data_source().await;
    Ok(Json(db_services::get_farm(repo.as_ref(), &FarmId::new(id)).await?))
}

/// PUT /api/farms/{id}
pub async fn update_farm(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<FarmUpdate>, JsonRejection>,
) -> HandlerResult<FarmRecord> {
    let repo = state.writable().await?;
    let Json(update) = payload?;
    Ok(Json(
        db_services::update_farm(repo.as_ref(), &FarmId::new(id), update).await?,
    ))
}

/// GET /api/farms/state/{state}
pub async fn farms_by_state(
    State(state): State<AppState>,
    Path(state_name): Path<String>,
) -> HandlerResult<Vec<FarmRecord>> {
    let repo = state.data_source().await;
    Ok(Json(
        db_services::farms_by_state(repo.as_ref(), &state_name).await?,
    ))
}

/// GET /api/farms/crop/{crop_type}
pub async fn farms_by_crop(
    State(state): State<AppState>,
    Path(crop_type): Path<String>,
) -> HandlerResult<Vec<FarmRecord>> {
    let repo = state.data_source().await;
    Ok(Json(
        db_services::farms_by_crop(repo.as_ref(), &crop_type).await?,
    ))
}

/// POST /api/farms/{id}/review
pub async fn add_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<NewReview>, JsonRejection>,
) -> HandlerResult<FarmRecord> {
    let repo = state.writable().await?;
    let Json(review) = payload?;
    Ok(Json(
        db_services::add_review(repo.as_ref(), &FarmId::new(id), review).await?,
    ))
}

// =============================================================================
// Crops
// =============================================================================

/// GET /api/crops
pub async fn list_crops(State(state): State<AppState>) -> HandlerResult<Vec<Crop>> {
    let repo = state.data_source().await;
    Ok(Json(db_services::list_crops(repo.as_ref()).await?))
}

/// GET /api/crops/stats/{crop_type}
pub async fn crop_stats(
    State(state): State<AppState>,
    Path(crop_type): Path<String>,
) -> HandlerResult<CropSummary> {
    let repo = state.data_source().await;
    Ok(Json(db_services::crop_stats(repo.as_ref(), &crop_type).await?))
}

/// GET /api/crops/stats/{crop_type}/top-states?limit=N
pub async fn top_states(
    State(state): State<AppState>,
    Path(crop_type): Path<String>,
    Query(query): Query<TopStatesQuery>,
) -> HandlerResult<TopStates> {
    let repo = state.data_source().await;
    Ok(Json(
        db_services::top_states(repo.as_ref(), &crop_type, query.limit).await?,
    ))
}

/// GET /api/crops/availability/{crop_type}
pub async fn crop_availability(
    State(state): State<AppState>,
    Path(crop_type): Path<String>,
) -> HandlerResult<Vec<AvailabilityEntry>> {
    let repo = state.data_source().await;
    Ok(Json(
        db_services::crop_availability(repo.as_ref(), &crop_type).await?,
    ))
}

/// GET /api/crops/heatmap/all
pub async fn heatmap(State(state): State<AppState>) -> HandlerResult<Vec<HeatPoint>> {
    let repo = state.data_source().await;
    Ok(Json(db_services::heatmap(repo.as_ref()).await?))
}

// =============================================================================
// Buyers
// =============================================================================

/// GET /api/buyers
pub async fn list_buyers(State(state): State<AppState>) -> HandlerResult<Vec<Buyer>> {
    let repo = state.writable().await?;
    Ok(Json(db_services::list_buyers(repo.as_ref()).await?))
}

/// POST /api/buyers
pub async fn create_buyer(
    State(state): State<AppState>,
    payload: Result<Json<NewBuyer>, JsonRejection>,
) -> CreatedResult<Buyer> {
    let repo = state.writable().await?;
    let Json(buyer) = payload?;
    let created = db_services::create_buyer(repo.as_ref(), buyer).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/buyers/{id}
pub async fn get_buyer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<Buyer> {
    let repo = state.writable().await?;
    Ok(Json(db_services::get_buyer(repo.as_ref(), &BuyerId::new(id)).await?))
}

/// POST /api/buyers/{id}/purchase
pub async fn add_purchase(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<NewPurchase>, JsonRejection>,
) -> HandlerResult<Buyer> {
    let repo = state.writable().await?;
    let Json(purchase) = payload?;
    Ok(Json(
        db_services::add_purchase(repo.as_ref(), &BuyerId::new(id), purchase).await?,
    ))
}

// =============================================================================
// Chat
// =============================================================================

/// GET /api/chat/{buyer_id}/{farm_id}
pub async fn get_chat(
    State(state): State<AppState>,
    Path((buyer_id, farm_id)): Path<(String, String)>,
) -> HandlerResult<Chat> {
    let repo = state.writable().await?;
    Ok(Json(
        db_services::get_chat(repo.as_ref(), &buyer_id, &farm_id).await?,
    ))
}

/// POST /api/chat/{buyer_id}/{farm_id}/message
pub async fn send_message(
    State(state): State<AppState>,
    Path((buyer_id, farm_id)): Path<(String, String)>,
    payload: Result<Json<NewMessage>, JsonRejection>,
) -> HandlerResult<Chat> {
    let repo = state.writable().await?;
    let Json(message) = payload?;
    Ok(Json(
        db_services::send_message(repo.as_ref(), &buyer_id, &farm_id, message).await?,
    ))
}

// =============================================================================
// Weather
// =============================================================================

fn parse_coordinates(lat: &str, lng: &str) -> Result<(f64, f64), AppError> {
    let parse = |name: &str, raw: &str| {
        raw.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| AppError::BadRequest(format!("{} must be a number, got '{}'", name, raw)))
    };
    Ok((parse("lat", lat)?, parse("lng", lng)?))
}

/// GET /api/weather/{lat}/{lng}
pub async fn current_weather(
    State(state): State<AppState>,
    Path((lat, lng)): Path<(String, String)>,
) -> HandlerResult<WeatherReport> {
    let (lat, lng) = parse_coordinates(&lat, &lng)?;
    Ok(Json(state.weather.current(lat, lng).await))
}

/// GET /api/weather/forecast/{lat}/{lng}
pub async fn weather_forecast(
    State(state): State<AppState>,
    Path((lat, lng)): Path<(String, String)>,
) -> HandlerResult<Vec<ForecastDay>> {
    let (lat, lng) = parse_coordinates(&lat, &lng)?;
    Ok(Json(state.weather.forecast(lat, lng).await))
}

// =============================================================================
// AI
// =============================================================================

/// POST /api/ai/predict-yield
pub async fn predict_yield(
    State(state): State<AppState>,
    payload: Result<Json<YieldRequest>, JsonRejection>,
) -> HandlerResult<YieldPrediction> {
    let Json(request) = payload?;
    Ok(Json(state.advisor.predict_yield(&request).await?))
}

/// POST /api/ai/crop-recommendation
pub async fn recommend_crops(
    State(state): State<AppState>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> HandlerResult<Vec<CropRecommendation>> {
    let Json(request) = payload?;
    Ok(Json(state.advisor.recommend_crops(&request).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coordinates() {
        assert_eq!(parse_coordinates("30.9", " 75.8").unwrap(), (30.9, 75.8));
        assert!(matches!(
            parse_coordinates("north", "75.8"),
            Err(AppError::BadRequest(_))
        ));
        assert!(parse_coordinates("NaN", "1").is_err());
    }
}
