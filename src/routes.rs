// Route definitions

use std::convert::Infallible;
use warp::Filter;

use crate::handlers;
use crate::models::InboundMessage;
use crate::state::AppState;

/// Largest webhook body accepted as a form
const MAX_FORM_BYTES: u64 = 64 * 1024;

pub fn configure_routes(
    state: AppState,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    // Unreadable or non-form bodies are handled like a message with no fields
    let inbound = warp::body::content_length_limit(MAX_FORM_BYTES)
        .and(warp::body::form::<InboundMessage>())
        .or(warp::any().map(InboundMessage::default))
        .unify();

    // POST /webhook
    let webhook = warp::path("webhook")
        .and(warp::path::end())
        .and(warp::post())
        .and(with_state(state))
        .and(inbound)
        .and_then(handlers::webhook_handler);

    // /health, any method
    let health = warp::path("health")
        .and(warp::path::end())
        .and_then(handlers::health_handler);

    // GET /
    let home = warp::path::end()
        .and(warp::get())
        .and_then(handlers::home_handler);

    webhook
        .or(health)
        .or(home)
        .with(warp::trace::request())
}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}
