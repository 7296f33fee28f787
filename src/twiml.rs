//! TwiML envelope for webhook replies

use std::fmt;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Content type of a rendered [`MessagingResponse`]
pub const CONTENT_TYPE: &str = "application/xml";

/// Reply to an inbound message, with at most one outbound message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessagingResponse {
    message: Option<String>,
}

impl MessagingResponse {
    /// Response that sends nothing back
    pub fn empty() -> Self {
        Self::default()
    }

    /// Response that sends `body` back to the sender
    pub fn message(body: impl Into<String>) -> Self {
        Self {
            message: Some(body.into()),
        }
    }

    pub fn body(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for MessagingResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(XML_DECLARATION)?;
        match &self.message {
            Some(body) => write!(f, "<Response><Message>{}</Message></Response>", escape(body)),
            None => f.write_str("<Response/>"),
        }
    }
}

/// Escape text for use as XML character data
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
