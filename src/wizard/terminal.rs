//! Terminal I/O for the wizard
//!
//! [`Terminal`] is the seam between the wizard driver and the screen.
//! [`CrosstermTerminal`] runs on the alternate screen and restores the
//! terminal when dropped, including on early returns.

use std::time::Duration;

use anyhow::Result;
use colored::{ColoredString, Colorize};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Text;
use ratatui::widgets::{Block, Paragraph, Wrap};

use super::state::Key;

pub trait Terminal {
    fn draw(&mut self, view: &Text<'_>) -> Result<()>;

    /// Block until the next key the wizard understands
    fn read_key(&mut self) -> Result<Key>;

    /// Return a key that is already waiting, without blocking
    fn poll_key(&mut self) -> Result<Option<Key>>;
}

pub struct CrosstermTerminal {
    terminal: DefaultTerminal,
}

impl CrosstermTerminal {
    /// Enter raw mode and the alternate screen
    pub fn acquire() -> Result<Self> {
        let terminal = ratatui::try_init()?;
        Ok(Self { terminal })
    }
}

impl Drop for CrosstermTerminal {
    fn drop(&mut self) {
        ratatui::restore();
    }
}

impl Terminal for CrosstermTerminal {
    fn draw(&mut self, view: &Text<'_>) -> Result<()> {
        self.terminal.draw(|frame| {
            let block = Block::bordered()
                .title(" reposync ")
                .border_style(Style::default().fg(Color::Cyan));
            let paragraph = Paragraph::new(view.clone())
                .block(block)
                .wrap(Wrap { trim: false });
            frame.render_widget(paragraph, frame.area());
        })?;
        Ok(())
    }

    fn read_key(&mut self) -> Result<Key> {
        loop {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(key) = map_key(key) {
                    return Ok(key);
                }
            }
        }
    }

    fn poll_key(&mut self) -> Result<Option<Key>> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(map_key(key));
                }
            }
        }
        Ok(None)
    }
}

pub fn map_key(key: KeyEvent) -> Option<Key> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Key::CtrlC),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Esc => Some(Key::Esc),
        KeyCode::Backspace | KeyCode::Delete => Some(Key::Backspace),
        KeyCode::Char(c) => Some(Key::Char(c)),
        _ => None,
    }
}

fn paint(content: &str, style: Style) -> ColoredString {
    let mut painted = match style.fg {
        Some(Color::Green) => content.green(),
        Some(Color::Red) => content.red(),
        Some(Color::Yellow) => content.yellow(),
        Some(Color::Cyan) => content.cyan(),
        Some(Color::DarkGray) => content.dimmed(),
        _ => content.normal(),
    };
    if style.add_modifier.contains(Modifier::BOLD) {
        painted = painted.bold();
    }
    painted
}

/// Print a view to stdout with ANSI colors
pub fn print_view(text: &Text<'_>) {
    for line in &text.lines {
        let rendered: String = line
            .spans
            .iter()
            .map(|span| paint(&span.content, line.style.patch(span.style)).to_string())
            .collect();
        println!("{}", rendered);
    }
}
