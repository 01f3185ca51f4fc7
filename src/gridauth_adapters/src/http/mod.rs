pub mod app_state;
pub mod routes;

pub use app_state::AppState;
pub use routes::AuthApiError;
