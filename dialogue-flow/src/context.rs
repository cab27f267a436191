use serde::{Deserialize, Serialize};

/// Rows of button labels, as shown under the input field.
pub type KeyboardLayout = Vec<Vec<String>>;

/// Mutable per-session scratch data shared by all tasks of a dialogue.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Analysis category picked from the inline list, if any
    pub selected_category: Option<String>,
    /// Inputs the bot could not make sense of since the last fallback message
    pub unrecognized_attempts: u32,
    /// Last navigable menu shown to the user, for "back"
    pub last_menu: Option<KeyboardLayout>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one unrecognized input. Returns `true` once `threshold` is reached,
    /// in which case the counter starts over from zero.
    pub fn register_miss(&mut self, threshold: u32) -> bool {
        self.unrecognized_attempts += 1;
        if self.unrecognized_attempts >= threshold {
            self.unrecognized_attempts = 0;
            return true;
        }
        false
    }

    pub fn select_category(&mut self, category: impl Into<String>) {
        self.selected_category = Some(category.into());
    }

    pub fn clear_category(&mut self) {
        self.selected_category = None;
    }

    pub fn remember_menu(&mut self, layout: KeyboardLayout) {
        self.last_menu = Some(layout);
    }
}
