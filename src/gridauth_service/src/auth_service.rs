use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::post,
};
use gridauth_adapters::http::{
    AppState,
    routes::{admin_reset_password, forgot_password, login, reset_password, verify_2fa},
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::tracing::{make_span_with_request_id, on_request, on_response};

/// The composed authentication service: credential login, two-factor
/// verification and the password-reset lifecycle behind one router.
pub struct AuthService {
    router: Router,
}

impl AuthService {
    pub fn new(state: AppState) -> Self {
        let router = Router::new()
            .route("/login", post(login))
            .route("/verify-2fa", post(verify_2fa))
            .route("/forgot-password", post(forgot_password))
            .route("/reset-password", post(reset_password))
            .route("/users/{id}/reset-password", post(admin_reset_password))
            .with_state(state);

        Self { router }
    }

    fn with_trace_layer(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(make_span_with_request_id)
                .on_request(on_request)
                .on_response(on_response),
        );
        self
    }

    /// Router ready for mounting under another application.
    pub fn into_router(mut self, allowed_origins: Option<Vec<HeaderValue>>) -> Router {
        if let Some(allowed_origins) = allowed_origins {
            let cors = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_credentials(true)
                .allow_origin(AllowOrigin::list(allowed_origins));

            self.router = self.router.layer(cors);
        }
        self.with_trace_layer().router
    }

    /// Run as a standalone server on `listener`.
    pub async fn run(
        self,
        listener: TcpListener,
        allowed_origins: Option<Vec<HeaderValue>>,
    ) -> Result<(), std::io::Error> {
        let router = self.into_router(allowed_origins);

        tracing::info!("Auth service listening on {}", listener.local_addr()?);

        axum::serve(listener, router).await
    }
}
