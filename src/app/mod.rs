use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, List, ListItem, Paragraph, Widget, Wrap},
    DefaultTerminal, Frame,
};
use tracing::{info, warn};

use crate::{
    history::{HistoryError, HistoryStore, Snapshot},
    navigator::Navigator,
};
pub use command::{Command, Notice};

mod command;

const HELP: &str = "i visit  d delete  < back  > forward  h history  c clear  q quit";

pub struct App {
    history: HistoryStore,
    navigator: Box<dyn Navigator>,
    status: AppStatus,
    notice: Option<Notice>,
    show_history: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum AppStatus {
    Browsing,
    Visiting(String),
    Deleting(String),
    ConfirmingClear,
}

impl AppStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppStatus::Browsing => "Browsing",
            AppStatus::Visiting(_) => "Visit",
            AppStatus::Deleting(_) => "Delete",
            AppStatus::ConfirmingClear => "Confirm",
        }
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let snapshot = self.history.snapshot();
        let layout = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ]);
        let [panes, chain, notice, command] = layout.areas(area);

        let stacks = if self.show_history {
            let layout = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]);
            let [history, stacks] = layout.areas(panes);
            history_list(&snapshot).render(history, buf);
            stacks
        } else {
            panes
        };
        let layout = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]);
        let [back, forward] = layout.areas(stacks);
        stack_list("Back Stack", &snapshot.back).render(back, buf);
        stack_list("Forward Stack", &snapshot.forward).render(forward, buf);

        let title = match snapshot.current {
            Some(index) => Line::from(snapshot.entries[index].as_str()).bold(),
            None => Line::from("Linked List"),
        };
        let moves = match (self.history.can_go_back(), self.history.can_go_forward()) {
            (true, true) => "< >",
            (true, false) => "<",
            (false, true) => ">",
            (false, false) => "",
        };
        let line = if self.history.is_empty() {
            "(empty)".to_string()
        } else {
            linked_list_line(&snapshot)
        };
        Paragraph::new(line)
            .wrap(Wrap { trim: true })
            .block(
                Block::bordered()
                    .title_top(title)
                    .title_bottom(Line::from(moves).right_aligned()),
            )
            .render(chain, buf);

        if let Some(message) = &self.notice {
            Paragraph::new(message.text())
                .style(Style::new().fg(message.color()))
                .render(notice, buf);
        }

        let layout = Layout::horizontal([Constraint::Min(2), Constraint::Length(10)]);
        let [left, right] = layout.areas(command);
        let prompt = match &self.status {
            AppStatus::Browsing => HELP.to_string(),
            AppStatus::Visiting(text) => format!("visit => {text}"),
            AppStatus::Deleting(text) => format!("delete => {text}"),
            AppStatus::ConfirmingClear => {
                "Are you sure you want to clear all history? (y/n)".to_string()
            }
        };
        Paragraph::new(prompt).render(left, buf);
        Paragraph::new(self.status.as_str()).render(right, buf);
    }
}

fn history_list(snapshot: &Snapshot) -> List<'_> {
    let items = snapshot.entries.iter().enumerate().map(|(index, address)| {
        if Some(index) == snapshot.current {
            ListItem::new(format!("{address} (current)")).style(Style::new().add_modifier(Modifier::BOLD))
        } else {
            ListItem::new(address.as_str())
        }
    });
    let title = format!("History ({})", snapshot.entries.len());
    List::new(items).block(Block::bordered().title_top(title))
}

fn stack_list<'a>(title: &'a str, stack: &'a [String]) -> List<'a> {
    let items = stack.iter().enumerate().map(|(depth, address)| {
        let item = ListItem::new(address.as_str());
        if depth == 0 {
            item.style(Style::new().fg(Color::Yellow))
        } else {
            item
        }
    });
    List::new(items).block(Block::bordered().title_top(title))
}

/// `a <-> [b] <-> c`, with the current node bracketed.
fn linked_list_line(snapshot: &Snapshot) -> String {
    snapshot
        .entries
        .iter()
        .enumerate()
        .map(|(index, address)| {
            if Some(index) == snapshot.current {
                format!("[{address}]")
            } else {
                address.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" <-> ")
}

impl App {
    pub(crate) fn new(navigator: Box<dyn Navigator>) -> Self {
        Self {
            history: HistoryStore::new(),
            navigator,
            status: AppStatus::Browsing,
            notice: None,
            show_history: true,
        }
    }

    /// Records addresses without navigating to them.
    pub fn preload<I>(&mut self, addresses: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for address in addresses {
            self.history.visit(address.as_ref());
        }
        info!(entries = self.history.len(), "Preloaded history");
    }

    pub fn run(mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            terminal.draw(|frame: &mut Frame| self.draw(frame))?;
            if event::poll(Duration::from_millis(300))? {
                if let Event::Key(key_event) = event::read()? {
                    if key_event.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.on_key(key_event.code) {
                        break;
                    }
                }
            }
        }
        info!(entries = ?self.history.all_entries(), "Session ended");
        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        frame.render_widget(self, frame.area());
    }

    /// Feeds one key press through the current mode. Returns `true` when the
    /// user asked to quit.
    fn on_key(&mut self, code: KeyCode) -> bool {
        match self.status {
            AppStatus::Browsing => match code {
                KeyCode::Esc | KeyCode::Char('q') => return true,
                KeyCode::Char('i') => self.status = AppStatus::Visiting(String::new()),
                KeyCode::Char('d') => self.status = AppStatus::Deleting(String::new()),
                KeyCode::Char('<') | KeyCode::Left => self.apply(Command::Back),
                KeyCode::Char('>') | KeyCode::Right => self.apply(Command::Forward),
                KeyCode::Char('h') => self.apply(Command::ToggleHistory),
                KeyCode::Char('c') => self.status = AppStatus::ConfirmingClear,
                _ => {}
            },
            AppStatus::Visiting(ref mut text) | AppStatus::Deleting(ref mut text) => match code {
                KeyCode::Esc => self.status = AppStatus::Browsing,
                KeyCode::Char(c) => text.push(c),
                KeyCode::Backspace => {
                    text.pop();
                }
                KeyCode::Enter => {
                    let text = std::mem::take(text);
                    let command = match self.status {
                        AppStatus::Deleting(_) => Command::Delete(text),
                        _ => Command::Visit(text),
                    };
                    self.status = AppStatus::Browsing;
                    self.apply(command);
                }
                _ => {}
            },
            AppStatus::ConfirmingClear => {
                self.status = AppStatus::Browsing;
                if matches!(code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                    self.apply(Command::Clear);
                }
            }
        }
        false
    }

    pub fn apply(&mut self, command: Command) {
        self.notice = None;
        match command {
            Command::Visit(text) => {
                if let Some(address) = self.history.visit(&text).map(str::to_owned) {
                    self.follow(&address);
                }
            }
            Command::Back => {
                let moved = self.history.go_back().map(str::to_owned);
                self.after_move(moved);
            }
            Command::Forward => {
                let moved = self.history.go_forward().map(str::to_owned);
                self.after_move(moved);
            }
            Command::Delete(text) => {
                let address = text.trim();
                if address.is_empty() {
                    self.notice = Some(Notice::Error("Please enter a URL to delete.".into()));
                    return;
                }
                self.notice = Some(match self.history.delete(address) {
                    Ok(()) => Notice::Info(format!("Deleted: {address}")),
                    Err(err) => Notice::Error(err.to_string()),
                });
            }
            Command::Clear => {
                self.history.clear();
                self.notice = Some(Notice::Info("History cleared.".into()));
            }
            Command::ToggleHistory => self.show_history = !self.show_history,
        }
    }

    fn after_move(&mut self, moved: Result<String, HistoryError>) {
        match moved {
            Ok(address) => self.follow(&address),
            Err(err) => self.notice = Some(Notice::Error(err.to_string())),
        }
    }

    fn follow(&mut self, address: &str) {
        if let Err(err) = self.navigator.navigate(address) {
            warn!(address, reason = %err.reason, "Navigation failed");
            self.notice = Some(Notice::Error(err.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::navigator::OpenFailed;

    #[derive(Clone, Default)]
    struct Recorder {
        opened: Rc<RefCell<Vec<String>>>,
        fail: bool,
    }

    impl Navigator for Recorder {
        fn navigate(&mut self, address: &str) -> Result<(), OpenFailed> {
            self.opened.borrow_mut().push(address.to_string());
            if self.fail {
                return Err(OpenFailed {
                    address: address.to_string(),
                    reason: "no handler".into(),
                });
            }
            Ok(())
        }
    }

    fn app_with(recorder: &Recorder) -> App {
        App::new(Box::new(recorder.clone()))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.on_key(KeyCode::Char(c));
        }
    }

    #[test]
    fn navigator_runs_once_per_successful_move() {
        let recorder = Recorder::default();
        let mut app = app_with(&recorder);
        app.apply(Command::Visit("a".into()));
        app.apply(Command::Visit("  ".into()));
        app.apply(Command::Visit("b".into()));
        app.apply(Command::Back);
        app.apply(Command::Forward);
        app.apply(Command::Forward);
        assert_eq!(*recorder.opened.borrow(), ["a", "b", "a", "b"]);
        assert_eq!(
            app.notice,
            Some(Notice::Error("No more forward history".into()))
        );
    }

    #[test]
    fn open_failure_is_reported_but_history_is_kept() {
        let recorder = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let mut app = app_with(&recorder);
        app.apply(Command::Visit("a".into()));
        assert_eq!(app.history.all_entries(), ["a"]);
        assert_eq!(
            app.notice,
            Some(Notice::Error("Failed to open URL: a".into()))
        );
    }

    #[test]
    fn delete_reports_outcome_without_navigating() {
        let recorder = Recorder::default();
        let mut app = app_with(&recorder);
        app.preload(["a", "b"]);

        app.apply(Command::Delete(" ".into()));
        assert_eq!(
            app.notice,
            Some(Notice::Error("Please enter a URL to delete.".into()))
        );

        app.apply(Command::Delete("zzz".into()));
        assert_eq!(
            app.notice,
            Some(Notice::Error("URL not found in history: zzz".into()))
        );

        app.apply(Command::Delete("a".into()));
        assert_eq!(app.notice, Some(Notice::Info("Deleted: a".into())));
        assert_eq!(app.history.all_entries(), ["b"]);
        assert!(recorder.opened.borrow().is_empty());
    }

    #[test]
    fn typing_then_enter_visits() {
        let recorder = Recorder::default();
        let mut app = app_with(&recorder);
        app.on_key(KeyCode::Char('i'));
        type_text(&mut app, "https://example.orx");
        app.on_key(KeyCode::Backspace);
        type_text(&mut app, "g");
        assert_eq!(app.status, AppStatus::Visiting("https://example.org".into()));
        assert!(!app.on_key(KeyCode::Enter));
        assert_eq!(app.status, AppStatus::Browsing);
        assert_eq!(app.history.current_address(), Some("https://example.org"));
        assert_eq!(*recorder.opened.borrow(), ["https://example.org"]);
    }

    #[test]
    fn escape_cancels_typing_and_quits_from_browsing() {
        let recorder = Recorder::default();
        let mut app = app_with(&recorder);
        app.on_key(KeyCode::Char('d'));
        type_text(&mut app, "abc");
        assert!(!app.on_key(KeyCode::Esc));
        assert_eq!(app.status, AppStatus::Browsing);
        assert!(app.notice.is_none());
        assert!(app.on_key(KeyCode::Esc));
    }

    #[test]
    fn clear_needs_confirmation() {
        let recorder = Recorder::default();
        let mut app = app_with(&recorder);
        app.preload(["a", "b"]);

        app.on_key(KeyCode::Char('c'));
        app.on_key(KeyCode::Char('n'));
        assert_eq!(app.history.len(), 2);

        app.on_key(KeyCode::Char('c'));
        assert_eq!(app.status, AppStatus::ConfirmingClear);
        app.on_key(KeyCode::Char('y'));
        assert!(app.history.is_empty());
        assert_eq!(app.notice, Some(Notice::Info("History cleared.".into())));
    }

    #[test]
    fn arrows_traverse_and_h_toggles_history_pane() {
        let recorder = Recorder::default();
        let mut app = app_with(&recorder);
        app.preload(["a", "b"]);
        app.on_key(KeyCode::Left);
        assert_eq!(app.history.current_address(), Some("a"));
        app.on_key(KeyCode::Right);
        assert_eq!(app.history.current_address(), Some("b"));
        assert!(app.show_history);
        app.on_key(KeyCode::Char('h'));
        assert!(!app.show_history);
    }

    #[test]
    fn linked_list_line_brackets_the_current_node() {
        let mut history = HistoryStore::new();
        assert_eq!(linked_list_line(&history.snapshot()), "");
        history.visit("a");
        history.visit("b");
        history.visit("a");
        history.go_back().unwrap();
        assert_eq!(linked_list_line(&history.snapshot()), "a <-> [b] <-> a");
    }

    #[test]
    fn renders_all_panes() {
        let recorder = Recorder::default();
        let mut app = app_with(&recorder);
        app.preload(["alpha", "beta"]);
        app.apply(Command::Back);

        let area = Rect::new(0, 0, 80, 14);
        let mut buf = Buffer::empty(area);
        (&app).render(area, &mut buf);
        let screen: String = buf.content().iter().map(|cell| cell.symbol()).collect();

        assert!(screen.contains("History (2)"));
        assert!(screen.contains("alpha (current)"));
        assert!(screen.contains("Back Stack"));
        assert!(screen.contains("Forward Stack"));
        assert!(screen.contains("[alpha] <-> beta"));
        assert!(screen.contains("Browsing"));
        assert!(screen.contains("< >"));
    }
}
