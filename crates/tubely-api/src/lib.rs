//! Tubely API Library
//!
//! HTTP handlers, authentication and application setup for the video
//! ingestion service.

mod api_doc;
pub mod auth;
pub mod constants;
pub mod error;
mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;

pub use error::{ErrorResponse, HttpAppError};
pub use state::{AppComponents, AppState};
