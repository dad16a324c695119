//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum
//! server. Routes are nested under `/api/`. Authentication and role
//! assignment live in an external layer; handlers receive already-
//! resolved actor ids.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the registry API router from a pre-constructed `ApiContext`.
pub fn api_router(ctx: ApiContext) -> Router {
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/medicines/lookup", get(endpoints::lookup::lookup))
        .route("/medicines", post(endpoints::medicines::create))
        .route("/medicines/:id", put(endpoints::medicines::update))
        .route("/medicines/:id", delete(endpoints::medicines::delete))
        .route(
            "/manufacturers/:id/medicines",
            get(endpoints::medicines::list_for_manufacturer),
        )
        .route("/flags", post(endpoints::flags::create))
        .route(
            "/manufacturers/:id/flags",
            get(endpoints::flags::list_for_manufacturer),
        )
        .route("/flags/:id/resolve", post(endpoints::flags::resolve))
        .with_state(ctx);

    Router::new().nest("/api", routes)
}
