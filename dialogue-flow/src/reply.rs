use serde::{Deserialize, Serialize};

use crate::context::KeyboardLayout;

/// A button attached to a message; pressing it produces a callback event with `data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    pub label: String,
    pub data: String,
}

impl InlineButton {
    pub fn new(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "rows", rename_all = "snake_case")]
pub enum Markup {
    /// Reply keyboard replacing the input field
    Keyboard(KeyboardLayout),
    /// Buttons attached to the message itself
    Inline(Vec<Vec<InlineButton>>),
}

/// One outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markup: Option<Markup>,
    /// Render `text` as Markdown
    #[serde(default)]
    pub markdown: bool,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: None,
            markdown: false,
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            markdown: true,
            ..Self::text(text)
        }
    }

    pub fn with_keyboard(mut self, layout: KeyboardLayout) -> Self {
        self.markup = Some(Markup::Keyboard(layout));
        self
    }

    pub fn with_inline(mut self, rows: Vec<Vec<InlineButton>>) -> Self {
        self.markup = Some(Markup::Inline(rows));
        self
    }
}
