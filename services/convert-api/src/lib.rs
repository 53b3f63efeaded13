//! Convert API Service Library
//!
//! HTTP shell around the reprojection engine. Each conversion runs on the
//! Tokio blocking pool with a cancellation token that is flipped on timeout
//! or when the client goes away.

pub mod error;
pub mod handlers;
pub mod metrics;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
