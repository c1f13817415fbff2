pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::AppState;

pub use terminal::{AppTerminal as Terminal, TerminalSession};
pub use theme::Theme;

use components::hints::{KeyHint, hint_separator, hints_to_spans};

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let area = frame.area();
    let theme = Theme::default();

    // Main layout: tabs, summary, list, bottom bar
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Tab bar (label + spacing)
            Constraint::Length(3), // Period summary
            Constraint::Min(0),    // Expense list
            Constraint::Length(1), // Bottom bar
        ])
        .split(area);

    components::tabs::render_tabs(frame, layout[0], state.tab, &theme);
    screens::expenses::render_summary(frame, layout[1], state, &theme);
    screens::expenses::render_list(frame, layout[2], state, &theme);
    render_bottom_bar(frame, layout[3], state, &theme);

    if let Some(manage) = &state.manage {
        screens::manage::render(frame, area, manage, &theme);
    }
    if state.loading {
        components::overlay::render_message(frame, area, "Loading...", theme.accent);
    }
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let hints = match &state.manage {
        None => vec![
            KeyHint::new("Tab", "switch"),
            KeyHint::new("↑↓", "select"),
            KeyHint::new("Enter", "edit"),
            KeyHint::new("a", "add"),
            KeyHint::new("r", "reload"),
        ],
        Some(manage) if manage.workflow.status().error().is_some() => {
            vec![KeyHint::new("Esc", "dismiss")]
        }
        Some(manage) => {
            let mut hints = vec![
                KeyHint::new("Tab", "next"),
                KeyHint::new("Enter", manage.workflow.submit_label().to_lowercase()),
                KeyHint::new("Esc", "cancel"),
            ];
            if manage.workflow.is_editing() {
                hints.push(KeyHint::new("Ctrl+D", "delete"));
            }
            hints
        }
    };

    let mut parts = hints_to_spans(&hints, theme);
    parts.push(hint_separator(theme));
    if state.manage.is_none() {
        parts.push(Span::styled("q", Style::default().fg(theme.accent)));
        parts.push(Span::raw(" quit"));
    } else {
        parts.push(Span::styled("Ctrl+C", Style::default().fg(theme.accent)));
        parts.push(Span::raw(" quit"));
    }

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}
