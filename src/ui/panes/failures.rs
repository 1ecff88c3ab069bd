//! Failure list rendering

use super::utils::{clamp_scroll, pane_block, visible_height};
use crate::generator::StructFailure;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

/// Render the structs that failed to resolve
pub fn render_failures_pane(
    frame: &mut Frame,
    area: Rect,
    failures: &[StructFailure],
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = pane_block(" Failures ", is_focused);

    if failures.is_empty() {
        let paragraph = Paragraph::new("(no failures)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.success));
        frame.render_widget(paragraph, area);
        return;
    }

    let visible = visible_height(area);
    clamp_scroll(scroll_offset, failures.len(), visible);

    let items: Vec<ListItem> = failures
        .iter()
        .skip(*scroll_offset)
        .take(visible)
        .map(|failure| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    failure.name.clone(),
                    Style::default().fg(DEFAULT_THEME.error),
                ),
                Span::raw(": "),
                Span::styled(
                    failure.error.to_string(),
                    Style::default().fg(DEFAULT_THEME.fg),
                ),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
