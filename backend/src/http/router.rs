//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    http::{HeaderValue, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use super::handlers;
use super::state::AppState;
use crate::routes::{advisor, buyers, chat, crops, farms, system, weather};

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers(Any)
}

async fn route_not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Route not found", "path": uri.path() })),
    )
}

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_origins);

    let api = Router::new()
        // System
        .route(system::TEST, get(handlers::test))
        .route(system::HEALTH, get(handlers::health_check))
        // Farms
        .route(
            farms::LIST_FARMS,
            get(handlers::list_farms).post(handlers::create_farm),
        )
        .route(
            farms::GET_FARM,
            get(handlers::get_farm).put(handlers::update_farm),
        )
        .route(farms::LIST_FARMS_BY_STATE, get(handlers::farms_by_state))
        .route(farms::LIST_FARMS_BY_CROP, get(handlers::farms_by_crop))
        .route(farms::POST_FARM_REVIEW, post(handlers::add_review))
        // Crops
        .route(crops::LIST_CROPS, get(handlers::list_crops))
        .route(crops::GET_CROP_STATS, get(handlers::crop_stats))
        .route(crops::GET_TOP_STATES, get(handlers::top_states))
        .route(crops::GET_CROP_AVAILABILITY, get(handlers::crop_availability))
        .route(crops::GET_HEATMAP, get(handlers::heatmap))
        // Buyers
        .route(
            buyers::LIST_BUYERS,
            get(handlers::list_buyers).post(handlers::create_buyer),
        )
        .route(buyers::GET_BUYER, get(handlers::get_buyer))
        .route(buyers::POST_PURCHASE, post(handlers::add_purchase))
        // Chat
        .route(chat::GET_CHAT, get(handlers::get_chat))
        .route(chat::POST_CHAT_MESSAGE, post(handlers::send_message))
        // Weather
        .route(weather::GET_WEATHER, get(handlers::current_weather))
        .route(weather::GET_FORECAST, get(handlers::weather_forecast))
        // AI
        .route(advisor::PREDICT_YIELD, post(handlers::predict_yield))
        .route(advisor::RECOMMEND_CROPS, post(handlers::recommend_crops));

    Router::new()
        .nest("/api", api)
        .fallback(route_not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::services::advisor::YieldAdvisor;
    use crate::services::weather::{OpenMeteoProvider, WeatherService};
    use std::sync::Arc;

    #[test]
    fn test_router_creation() {
        let weather = WeatherService::new(Arc::new(
            OpenMeteoProvider::new("http://127.0.0.1:9").unwrap(),
        ));
        let state = AppState::new(
            Arc::new(LocalRepository::new()),
            weather,
            YieldAdvisor::unconfigured(),
        )
        .with_cors_origins(vec!["not a header\n".to_string()]);
        let _router = create_router(state);
    }
}
