// POST /webhook handler

use std::convert::Infallible;
use tracing::{info, warn};

use crate::models::{Command, InboundMessage};
use crate::reply::{error_reply, format_reply, USAGE_HINT};
use crate::state::AppState;
use crate::twiml::{MessagingResponse, CONTENT_TYPE};

/// Always answers 200 so the platform never retries a delivery
pub async fn webhook_handler(
    state: AppState,
    inbound: InboundMessage,
) -> Result<impl warp::Reply, Infallible> {
    let response = relay(&state, &inbound).await;

    Ok(warp::reply::with_header(
        response.to_string(),
        "content-type",
        CONTENT_TYPE,
    ))
}

/// Turn one inbound message into the reply envelope
pub async fn relay(state: &AppState, inbound: &InboundMessage) -> MessagingResponse {
    let question = match inbound.command() {
        Command::Ignore => {
            info!(from = %inbound.from, "POST /webhook: not addressed to the bot");
            return MessagingResponse::empty();
        }
        Command::MissingQuestion => {
            info!(from = %inbound.from, "POST /webhook: empty question");
            return MessagingResponse::message(USAGE_HINT);
        }
        Command::Ask(question) => question,
    };

    info!(
        from = %inbound.from,
        chars = question.chars().count(),
        "POST /webhook: relaying question"
    );

    let handle = state.store.get_or_create(&inbound.from).await;
    let mut conversation = handle.lock().await;

    match state.gateway.complete(&mut *conversation, question).await {
        Ok(text) => MessagingResponse::message(format_reply(&text)),
        Err(err) => {
            warn!(from = %inbound.from, error = %err, "completion failed");
            MessagingResponse::message(error_reply(&err.message))
        }
    }
}
