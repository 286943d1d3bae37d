use axum::{Router, extract::DefaultBodyLimit};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::presentation::http::{
    handlers::UploadHandler,
    routes::{health_routes, not_found_handler, upload_routes},
};

pub struct HttpServer {
    upload_handler: Arc<UploadHandler>,
    port: u16,
    max_upload_bytes: usize,
}

impl HttpServer {
    pub fn new(upload_handler: Arc<UploadHandler>, port: u16, max_upload_bytes: usize) -> Self {
        Self {
            upload_handler,
            port,
            max_upload_bytes,
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.upload_handler.clone(), self.max_upload_bytes)
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));

        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Server running on http://localhost:{}", self.port);
        axum::serve(listener, app).await?;

        Ok(())
    }
}

pub fn build_router(upload_handler: Arc<UploadHandler>, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // The multipart extractor's own 2MB default would undercut the configured cap.
    let limits = ServiceBuilder::new()
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes));

    let trace = TraceLayer::new_for_http()
        .on_request(
            |request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {
                tracing::info!("Received request: {} {}", request.method(), request.uri());
            },
        )
        .on_response(
            |response: &axum::http::Response<axum::body::Body>,
             latency: std::time::Duration,
             _span: &tracing::Span| {
                tracing::info!(
                    "Response: {} (took {} ms)",
                    response.status(),
                    latency.as_millis()
                );
            },
        )
        .on_failure(
            |error: ServerErrorsFailureClass, latency: std::time::Duration, _span: &tracing::Span| {
                tracing::error!(
                    "Request failed: {:?} (took {} ms)",
                    error,
                    latency.as_millis()
                );
            },
        );

    Router::new()
        .merge(health_routes())
        .merge(upload_routes(upload_handler))
        .fallback(not_found_handler)
        .layer(cors)
        .layer(limits)
        .layer(trace)
}
