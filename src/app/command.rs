use ratatui::style::Color;

/// A user action, already decoded from keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Visit(String),
    Back,
    Forward,
    Delete(String),
    Clear,
    ToggleHistory,
}

/// One-line message shown under the panes until the next command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Info(text) | Notice::Error(text) => text,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Notice::Info(_) => Color::Green,
            Notice::Error(_) => Color::Red,
        }
    }
}
