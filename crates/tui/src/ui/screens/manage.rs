use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::{
    app::ManageState,
    form::FormField,
    ui::{components::overlay, theme::Theme},
};

const FIELDS: [FormField; 3] = [FormField::Amount, FormField::Date, FormField::Description];

pub fn render(frame: &mut Frame<'_>, area: Rect, manage: &ManageState, theme: &Theme) {
    let status = manage.workflow.status();
    if let Some(message) = status.error() {
        overlay::render_message(frame, area, message, theme.error);
        return;
    }
    if let Some(label) = manage.pending {
        overlay::render_message(frame, area, label, theme.accent);
        return;
    }

    let card = overlay::centered_box(48, 12, area);
    frame.render_widget(Clear, card);

    let block = Block::default()
        .title(format!(" {} ", manage.workflow.title()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(card);
    frame.render_widget(block, card);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Amount
            Constraint::Length(2), // Date
            Constraint::Length(2), // Description
            Constraint::Min(0),    // Message
        ])
        .margin(1)
        .split(inner);

    for (field, row) in FIELDS.into_iter().zip(rows.iter()) {
        render_field(frame, *row, manage, field, theme);
    }

    if let Some(message) = &manage.message {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                message.as_str(),
                Style::default().fg(theme.error),
            ))),
            rows[3],
        );
    }
}

fn render_field(
    frame: &mut Frame<'_>,
    area: Rect,
    manage: &ManageState,
    field: FormField,
    theme: &Theme,
) {
    let focused = manage.form.focus == field;
    let invalid = manage.form.errors.get(field);

    let label_style = if invalid {
        Style::default().fg(theme.error)
    } else {
        Style::default().fg(theme.text_muted)
    };
    let value_style = if focused {
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text)
    };

    let cursor = if focused { "_" } else { "" };
    let lines = vec![
        Line::from(Span::styled(field.label(), label_style)),
        Line::from(vec![
            Span::styled(manage.form.value(field).to_string(), value_style),
            Span::styled(cursor, value_style),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}
