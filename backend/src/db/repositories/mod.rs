//! Repository implementations.
//!
//! - `local`: the live in-memory document store, optionally persisted to a JSON snapshot
//! - `fallback`: a static read-only dataset used while the live store is unavailable
pub mod fallback;
pub mod local;

pub use fallback::FallbackRepository;
pub use local::LocalRepository;
