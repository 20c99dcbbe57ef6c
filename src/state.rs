use std::collections::VecDeque;

use chrono::Local;

use crate::epa_model::QueryOutcome;

pub const MIN_YDSTOGO: u8 = 1;
pub const MAX_YDSTOGO: u8 = 10;
pub const MIN_YARDLINE: u8 = 1;
pub const MAX_YARDLINE: u8 = 75;

pub const DEFAULT_YDSTOGO: u8 = 1;
pub const DEFAULT_YARDLINE: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    YardsToGo,
    Yardline,
}

impl InputField {
    pub fn toggle(self) -> Self {
        match self {
            Self::YardsToGo => Self::Yardline,
            Self::Yardline => Self::YardsToGo,
        }
    }
}

#[derive(Debug)]
pub struct AppState {
    pub ydstogo: u8,
    pub yardline: u8,
    pub focus: InputField,
    pub outcome: Option<QueryOutcome>,
    /// Inputs that produced `outcome`. The charts mark this yardline, not the
    /// one currently being edited.
    pub queried: Option<(u8, u8)>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            ydstogo: DEFAULT_YDSTOGO,
            yardline: DEFAULT_YARDLINE,
            focus: InputField::YardsToGo,
            outcome: None,
            queried: None,
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        let stamp = Local::now().format("%H:%M:%S");
        self.logs.push_back(format!("{stamp} {}", msg.into()));
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = self.focus.toggle();
    }

    pub fn adjust(&mut self, delta: i16) {
        let (min, max) = self.bounds();
        let next = i16::from(self.focused_value())
            .saturating_add(delta)
            .clamp(i16::from(min), i16::from(max)) as u8;
        self.set_focused(next);
    }

    /// Appends a typed digit; restarts from the digit when the result leaves
    /// the field's range.
    pub fn push_digit(&mut self, digit: u8) {
        let (min, max) = self.bounds();
        let extended = u16::from(self.focused_value()) * 10 + u16::from(digit);
        let next = if extended <= u16::from(max) {
            extended as u8
        } else {
            digit.clamp(min, max)
        };
        self.set_focused(next.max(min));
    }

    pub fn backspace(&mut self) {
        let (min, _) = self.bounds();
        self.set_focused((self.focused_value() / 10).max(min));
    }

    fn bounds(&self) -> (u8, u8) {
        match self.focus {
            InputField::YardsToGo => (MIN_YDSTOGO, MAX_YDSTOGO),
            InputField::Yardline => (MIN_YARDLINE, MAX_YARDLINE),
        }
    }

    fn focused_value(&self) -> u8 {
        match self.focus {
            InputField::YardsToGo => self.ydstogo,
            InputField::Yardline => self.yardline,
        }
    }

    fn set_focused(&mut self, value: u8) {
        match self.focus {
            InputField::YardsToGo => self.ydstogo = value,
            InputField::Yardline => self.yardline = value,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjust_clamps_to_field_bounds() {
        let mut state = AppState::new();
        state.focus = InputField::YardsToGo;
        state.ydstogo = 10;
        state.adjust(1);
        assert_eq!(state.ydstogo, 10);
        state.adjust(-20);
        assert_eq!(state.ydstogo, 1);

        state.focus = InputField::Yardline;
        state.yardline = 75;
        state.adjust(5);
        assert_eq!(state.yardline, 75);
    }

    #[test]
    fn digits_extend_or_restart() {
        let mut state = AppState::new();
        state.focus = InputField::Yardline;
        state.yardline = 7;
        state.push_digit(5);
        assert_eq!(state.yardline, 75);
        // 75 -> 753 is out of range, so typing restarts from the digit.
        state.push_digit(3);
        assert_eq!(state.yardline, 3);

        state.focus = InputField::YardsToGo;
        state.ydstogo = 7;
        state.push_digit(5);
        assert_eq!(state.ydstogo, 5);
    }

    #[test]
    fn backspace_never_leaves_the_range() {
        let mut state = AppState::new();
        state.focus = InputField::Yardline;
        state.yardline = 75;
        state.backspace();
        assert_eq!(state.yardline, 7);
        state.backspace();
        assert_eq!(state.yardline, 1);
    }

    #[test]
    fn log_buffer_is_bounded() {
        let mut state = AppState::new();
        for idx in 0..400 {
            state.push_log(format!("[INFO] entry {idx}"));
        }
        assert_eq!(state.logs.len(), 200);
    }
}
