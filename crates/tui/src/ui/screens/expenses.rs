use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use engine::Money;

use crate::{app::AppState, ui::theme::Theme};

/// Period label and sum of the visible expenses.
pub fn render_summary(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let visible = state.visible();
    let total: Money = visible.iter().map(|e| e.amount).sum();

    let mut line = vec![
        Span::styled(state.period_label(), Style::default().fg(theme.text_muted)),
        Span::raw("  "),
        Span::styled(
            total.to_string(),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
    ];

    if let Some(err) = &state.load_error {
        line.push(Span::raw("   "));
        line.push(Span::styled(err.as_str(), Style::default().fg(theme.error)));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border));
    frame.render_widget(Paragraph::new(Line::from(line)).block(block), area);
}

pub fn render_list(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let visible = state.visible();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(state.tab.label());

    if visible.is_empty() {
        let fallback = match state.tab {
            crate::app::Tab::Recent => format!(
                "No expenses registered for the last {} days.",
                state.recent_days
            ),
            crate::app::Tab::All => "No registered expenses found!".to_string(),
        };
        let content = Paragraph::new(Line::from(Span::styled(
            fallback,
            Style::default().fg(theme.text_muted),
        )))
        .block(block);
        frame.render_widget(content, area);
        return;
    }

    let items = visible
        .iter()
        .map(|expense| {
            let date = expense.date.format("%Y-%m-%d").to_string();
            let amount = expense.amount.to_string();
            let text = format!("{date}  {amount:>12}  {}", expense.description);
            ListItem::new(Line::from(text))
        })
        .collect::<Vec<_>>();

    let mut list_state = ListState::default();
    list_state.select(Some(state.selected));

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("» ");

    frame.render_stateful_widget(list, area, &mut list_state);
}
