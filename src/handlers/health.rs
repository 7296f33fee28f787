// GET /health handler

use std::convert::Infallible;
use warp::http::StatusCode;

pub const HEALTH_TEXT: &str = "Bot funcionando correctamente ✅";

pub async fn health_handler() -> Result<impl warp::Reply, Infallible> {
    Ok(warp::reply::with_status(HEALTH_TEXT, StatusCode::OK))
}
