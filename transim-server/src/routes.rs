use axum::error_handling::HandleErrorLayer;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{BoxError, Router, middleware};
use tower::ServiceBuilder;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::HttpConfig;
use crate::error::ApiError;
use crate::handlers::{admin, network, simulation};
use crate::state::AppState;

pub fn create_router(state: AppState, http: &HttpConfig) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stops", get(network::list_stops))
        .route("/api/routes", get(network::list_routes))
        .route("/api/transport", get(network::list_vehicles))
        .route("/api/transport/live", get(simulation::live_positions))
        .route("/api/transport/live/{id}", get(simulation::live_position))
        .route("/api/admin/stop", post(admin::upsert_stop))
        .route("/api/admin/route", post(admin::upsert_route))
        .route("/api/admin/transport", post(admin::upsert_vehicle))
        .route("/api/simulation/control", post(simulation::control))
        .route("/api/simulation/status", get(simulation::status))
        .layer(middleware::map_response(no_cache))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(request_limit(http))
                .timeout(http.request_timeout()),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// In-flight request cap. `Router::layer` wraps every route on its own, so
/// the permits live in one semaphore shared by all the clones.
fn request_limit(http: &HttpConfig) -> GlobalConcurrencyLimitLayer {
    GlobalConcurrencyLimitLayer::new(http.concurrency_limit)
}

async fn health() -> &'static str {
    "OK"
}

/// Live data must never be served from a cache
async fn no_cache(mut response: Response) -> Response {
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, max-age=0"),
    );
    response
}

async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<tower::timeout::error::Elapsed>() {
        ApiError::new(StatusCode::REQUEST_TIMEOUT, "Request timed out")
    } else {
        ApiError::internal(format!("Unhandled internal error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::task::{Context, Poll, Waker};

    use tower::{Layer, Service, service_fn};

    use super::*;

    #[test]
    fn request_limit_is_shared_between_routes() {
        let http = HttpConfig {
            concurrency_limit: 1,
            ..HttpConfig::default()
        };
        let limit = request_limit(&http);
        let handler = || service_fn(|_: ()| async { Ok::<_, Infallible>(()) });
        let mut stops = limit.clone().layer(handler());
        let mut vehicles = limit.layer(handler());
        let mut cx = Context::from_waker(Waker::noop());

        assert!(matches!(
            Service::<()>::poll_ready(&mut stops, &mut cx),
            Poll::Ready(Ok(()))
        ));
        assert!(Service::<()>::poll_ready(&mut vehicles, &mut cx).is_pending());

        drop(stops);
        assert!(matches!(
            Service::<()>::poll_ready(&mut vehicles, &mut cx),
            Poll::Ready(Ok(()))
        ));
    }
}
