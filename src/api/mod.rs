//! Coin Classifier REST API Module

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use handlers::AppState;
pub use middleware::start_cleanup_task;
pub use routes::create_router;
pub use types::*;
