pub mod cache;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod media;
pub mod multipart;
pub mod router;
pub mod state;
pub mod telemetry;
pub mod templates;
pub mod urls;

pub use router::app_router;
pub use state::AppState;
