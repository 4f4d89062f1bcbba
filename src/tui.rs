use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::{DefaultTerminal, Frame};

use crate::error::Result;
use crate::fmt::money;

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

pub const FOOTER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const NOTE_STYLE: Style = Style::new()
    .fg(Color::Cyan)
    .add_modifier(Modifier::ITALIC);

pub const BAR_STYLE: Style = Style::new().fg(Color::Rgb(26, 118, 210));

const VALUE_STYLE: Style = Style::new().fg(Color::Rgb(80, 220, 100));
const NEGATIVE_STYLE: Style = Style::new().fg(Color::Red);

/// Amount as a Span; negatives (refunds, corrections) in red.
pub fn money_span(amount: f64) -> Span<'static> {
    let style = if amount < 0.0 { NEGATIVE_STYLE } else { VALUE_STYLE };
    Span::styled(money(amount), style)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
    Continue,
    Close,
    /// Re-read the inputs. The run loop calls [`View::reload`].
    Reload,
}

/// A full-screen view driven by [`run_view`].
pub trait View {
    fn draw(&mut self, frame: &mut Frame);
    fn handle_key(&mut self, code: KeyCode) -> ViewAction;
    fn reload(&mut self) {}
}

/// Route one key event. Ctrl-C always closes; releases and repeats are ignored.
fn dispatch(view: &mut dyn View, key: KeyEvent) -> ViewAction {
    if key.kind != KeyEventKind::Press {
        return ViewAction::Continue;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return ViewAction::Close;
    }
    match view.handle_key(key.code) {
        ViewAction::Reload => {
            view.reload();
            ViewAction::Continue
        }
        action => action,
    }
}

/// Owns the terminal while a view runs and restores it on drop, including
/// when the loop returns early with an error.
struct TerminalGuard {
    terminal: DefaultTerminal,
}

impl TerminalGuard {
    fn enter() -> Self {
        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            ratatui::restore();
            hook(info);
        }));
        Self {
            terminal: ratatui::init(),
        }
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        ratatui::restore();
    }
}

pub fn run_view(view: &mut dyn View) -> Result<()> {
    let mut guard = TerminalGuard::enter();
    loop {
        guard.terminal.draw(|frame| view.draw(frame))?;
        if let Event::Key(key) = event::read()? {
            if dispatch(view, key) == ViewAction::Close {
                return Ok(());
            }
        }
    }
}
