pub mod app;
pub mod bootstrap;
pub mod errors;
pub mod models;
pub mod sse;

pub use app::{create_app, AppState};
pub use bootstrap::build_service;
