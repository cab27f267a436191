use serde::{Deserialize, Serialize};

/// An inbound chat event. Kinds are structurally distinct: a callback is never
/// confused with a text message carrying the same characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    /// Plain text typed by the user or sent by a reply-keyboard button
    Text { text: String },
    /// Data token of a pressed inline button
    Callback { data: String },
    /// Slash command without the leading slash, e.g. `start`
    Command { name: String },
    /// Voice clip available for download
    Voice { file_url: String },
}

impl Event {
    pub fn text(text: impl Into<String>) -> Self {
        Event::Text { text: text.into() }
    }

    pub fn callback(data: impl Into<String>) -> Self {
        Event::Callback { data: data.into() }
    }

    pub fn command(name: impl Into<String>) -> Self {
        Event::Command { name: name.into() }
    }

    pub fn voice(file_url: impl Into<String>) -> Self {
        Event::Voice {
            file_url: file_url.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Event::Text { .. } => "text",
            Event::Callback { .. } => "callback",
            Event::Command { .. } => "command",
            Event::Voice { .. } => "voice",
        }
    }
}
