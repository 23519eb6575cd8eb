//! # Kisaan Mandi Backend
//!
//! Marketplace backend connecting farmers who list crop harvests with bulk buyers.
//!
//! The crate stores farm listings, buyers and buyer-farmer chats, derives crop
//! statistics (totals, averages, per-state distributions, heat-map points)
//! from the listings, and proxies weather and generative-AI lookups. When
//! the live store is unavailable, reads are served from a deterministic
//! synthetic dataset.
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Request and response types of the REST API
//! - [`models`]: Stored documents (farms, crops, buyers, chats)
//! - [`db`]: Repository pattern, local and fallback stores, service layer
//! - [`services`]: Aggregation engine, seed data, weather and AI proxies
//! - [`http`]: Axum-based HTTP server and request handlers
//! - [`routes`]: Route paths and route-specific data types

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;

pub mod db;
pub mod models;

pub mod routes;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
