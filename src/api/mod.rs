pub mod v1;

use crate::server::Server;
use std::sync::Arc;
use warp::Filter;

/// The full HTTP surface: `/api/v1/*`, error recovery, CORS and request spans.
pub fn app(
    server: Arc<Server>,
    allowed_origins: Vec<String>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let cors = warp::cors()
        .allow_origins(allowed_origins.iter().map(String::as_str))
        .allow_credentials(true)
        .allow_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allow_headers(vec!["authorization", "content-type"])
        .max_age(24 * 60 * 60);

    warp::path("api")
        .and(warp::path("v1"))
        .and(v1::routes(server))
        .recover(v1::recover_error)
        .with(cors)
        .with(warp::trace::request())
}
