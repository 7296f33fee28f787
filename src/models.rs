// Inbound webhook payload

use serde::Deserialize;

/// Command prefix that routes a chat message to the model
pub const COMMAND_PREFIX: &str = "!bot";

/// The fields of a Twilio messaging webhook this service reads
///
/// Missing fields are empty strings; all other webhook fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InboundMessage {
    /// Message text
    #[serde(rename = "Body", default)]
    pub body: String,
    /// Sender address, e.g. `whatsapp:+34600111222`
    #[serde(rename = "From", default)]
    pub from: String,
}

/// What an inbound message asks the bot to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    /// Not addressed to the bot
    Ignore,
    /// Prefix present but nothing after it
    MissingQuestion,
    /// Question to relay to the model
    Ask(&'a str),
}

impl InboundMessage {
    pub fn new(body: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            from: from.into(),
        }
    }

    /// Classify the message body
    pub fn command(&self) -> Command<'_> {
        let body = self.body.trim();
        match body.strip_prefix(COMMAND_PREFIX) {
            None => Command::Ignore,
            Some(rest) => match rest.trim() {
                "" => Command::MissingQuestion,
                question => Command::Ask(question),
            },
        }
    }
}
