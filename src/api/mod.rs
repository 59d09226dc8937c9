pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod upload;

pub use error::{ApiError, ApiResult};
pub use routes::configure_routes;
pub use state::ApiState;
