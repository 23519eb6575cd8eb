//! Service layer for business logic and orchestration.
//!
//! Pure aggregation over farm listings, synthetic data generation, and the
//! best-effort proxies to the weather and generative-AI upstreams. The
//! proxies sit behind traits so handlers and tests can swap them out.

pub mod advisor;
pub mod aggregation;
pub mod seed;
pub mod weather;

pub use advisor::{AiError, GeminiGenerator, TextGenerator, YieldAdvisor};
pub use aggregation::{build_crop_catalogue, rank_states, summarize_by_crop_type, to_heat_points};
pub use seed::{fallback_dataset, generate_farms, initialize_data};
pub use weather::{OpenMeteoProvider, WeatherError, WeatherProvider, WeatherService};
