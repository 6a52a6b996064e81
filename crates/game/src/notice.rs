//! Instruction notices ("Press 'E' to enter Grass").

/// A notice on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    token: u64,
}

/// The single notice slot. Showing a notice replaces the current one and
/// invalidates its pending hide.
#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    current: Option<Notice>,
    next_token: u64,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text on screen, if any.
    pub fn text(&self) -> Option<&str> {
        self.current.as_ref().map(|notice| notice.text.as_str())
    }

    /// Show `text` and return the token its scheduled hide must carry.
    pub fn show(&mut self, text: impl Into<String>) -> u64 {
        let token = self.next_token;
        self.next_token += 1;

        let text = text.into();
        if self.text() != Some(text.as_str()) {
            log::debug!("notice: {}", text);
        }
        self.current = Some(Notice { text, token });
        token
    }

    /// Handle a due hide. Ignored when the notice was replaced since.
    pub fn expire(&mut self, token: u64) {
        if self.current.as_ref().is_some_and(|notice| notice.token == token) {
            self.current = None;
        }
    }

    /// Hide the notice if its text starts with `prefix`.
    pub fn clear_matching(&mut self, prefix: &str) {
        if self.text().is_some_and(|text| text.starts_with(prefix)) {
            self.current = None;
        }
    }

    pub fn hide(&mut self) {
        self.current = None;
    }
}
