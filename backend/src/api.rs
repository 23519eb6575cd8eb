//! Public API surface for the Kisaan Mandi backend.
//!
//! This file consolidates the request and response types of the HTTP API.
//! All types derive Serialize/Deserialize for JSON serialization.

pub use crate::models::{
    Buyer, BuyerId, BuyerLocation, Chat, ChatId, ChatMessage, ChatSender, Crop, CropId,
    FarmFilter, FarmId, FarmRecord, FarmUpdate, NewBuyer, NewFarm, NewMessage, NewPurchase,
    NewReview, Purchase, QualityReview, StateDistribution, StateQuantity,
};
pub use crate::routes::advisor::{
    Advice, CropRecommendation, FormValue, RecommendationRequest, YieldPrediction, YieldRequest,
};
pub use crate::routes::crops::{
    AvailabilityEntry, CropSummary, HeatPoint, TopStates, TopStatesQuery,
};
pub use crate::routes::farms::FarmQuery;
pub use crate::routes::system::{HealthResponse, TestResponse};
pub use crate::routes::weather::{ForecastDay, WeatherReport};
