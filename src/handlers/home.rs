// GET / handler

use std::convert::Infallible;

pub const HOME_HTML: &str = r#"
    <h1>WhatsApp Gemini Bot</h1>
    <p>El bot está activo y esperando mensajes.</p>
    <p>Usa: <code>!bot tu pregunta aquí</code></p>
    "#;

pub async fn home_handler() -> Result<impl warp::Reply, Infallible> {
    Ok(warp::reply::html(HOME_HTML))
}
