//! Text of the replies sent back to the chat

/// Marker every bot reply starts with
pub const REPLY_MARKER: &str = "@bot ";

/// Longest reply, in characters, before the truncation notice is added
pub const MAX_REPLY_CHARS: usize = 1500;

/// Appended to replies cut at [`MAX_REPLY_CHARS`]
pub const TRUNCATION_SUFFIX: &str = "...\n\n(Respuesta cortada por longitud)";

/// Reply sent when the command prefix is not followed by a question
pub const USAGE_HINT: &str =
    "@bot Por favor, escribe algo después de !bot. Ejemplo: !bot ¿Qué es Python?";

/// Prefix the marker and cut overly long replies
///
/// Length is counted in characters, not bytes. A truncated reply is longer
/// than [`MAX_REPLY_CHARS`] by exactly the suffix length.
pub fn format_reply(raw_text: &str) -> String {
    let reply = format!("{}{}", REPLY_MARKER, raw_text);

    match reply.char_indices().nth(MAX_REPLY_CHARS) {
        Some((cut, _)) => {
            let mut truncated = String::with_capacity(cut + TRUNCATION_SUFFIX.len());
            truncated.push_str(&reply[..cut]);
            truncated.push_str(TRUNCATION_SUFFIX);
            truncated
        }
        None => reply,
    }
}

/// Reply reporting a failed completion
pub fn error_reply(message: &str) -> String {
    format!("{}❌ Error: {}", REPLY_MARKER, message)
}
