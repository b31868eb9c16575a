//! Route table.

use crate::handler::{self, HandlerContext};
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, on, MethodFilter, MethodRouter};
use axum::Router;
use connhub_sync_protocol::{Endpoint, Method};
use std::sync::Arc;
use tracing::debug;

/// Builds the router serving the static pages and the sync API.
///
/// Unknown paths answer 404 and known paths with the wrong method answer 405,
/// both with a plain-text body.
pub fn build_router(context: Arc<HandlerContext>) -> Router {
    let mut router: Router<Arc<HandlerContext>> = Router::new()
        .route("/", get(handler::index))
        .route("/index.html", get(handler::index))
        .route("/favicon.ico", get(handler::favicon));

    for endpoint in Endpoint::ALL {
        router = router.route(endpoint.route(), endpoint_route(endpoint));
    }

    router
        .fallback(handler::not_found)
        .method_not_allowed_fallback(handler::method_not_allowed)
        .layer(middleware::from_fn(trace_request))
        .with_state(context)
}

fn endpoint_route(endpoint: Endpoint) -> MethodRouter<Arc<HandlerContext>> {
    let filter = method_filter(endpoint.method());
    match endpoint {
        Endpoint::State => on(filter, handler::state),
        Endpoint::Text => on(filter, handler::set_text),
        Endpoint::Upload => on(filter, handler::upload),
        Endpoint::Download => on(filter, handler::download),
        Endpoint::Delete => on(filter, handler::delete),
    }
}

fn method_filter(method: Method) -> MethodFilter {
    match method {
        Method::Get => MethodFilter::GET,
        Method::Post => MethodFilter::POST,
        Method::Delete => MethodFilter::DELETE,
    }
}

async fn trace_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    debug!(method = %method, path = %path, status = response.status().as_u16(), "request");
    response
}
