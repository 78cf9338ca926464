pub mod error;
pub mod extract;
pub mod router;
pub mod types;
pub mod handlers {
    pub mod auth;
    pub mod catalog;
    pub mod health;
    pub mod library;
    pub mod reviews;
    pub mod stats;
}

pub use error::ApiError;
pub use router::{build_app, create_router, ApiDoc};
pub use types::AppState;
