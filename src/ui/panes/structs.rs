//! Struct list rendering

use super::utils::{follow_selection, pane_block, visible_height};
use crate::generator::Resolution;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

/// Render the list of resolved structs. Aliases show their target.
pub fn render_structs_pane(
    frame: &mut Frame,
    area: Rect,
    resolution: &Resolution,
    selected: usize,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = pane_block(" Structs ", is_focused);

    if resolution.registry.is_empty() {
        let paragraph = Paragraph::new("(no structs resolved)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let content_width = area.width.saturating_sub(2) as usize;
    let total_items = resolution.registry.len();
    let visible = visible_height(area);
    follow_selection(scroll_offset, selected, total_items, visible);

    let items: Vec<ListItem> = resolution
        .registry
        .iter()
        .enumerate()
        .skip(*scroll_offset)
        .take(visible)
        .map(|(i, layout)| {
            let size = format!("{} B", layout.size);
            let name_style = match resolution.alias_target(&layout.name) {
                Some(_) => Style::default().fg(DEFAULT_THEME.comment),
                None => Style::default().fg(DEFAULT_THEME.type_name),
            };

            let mut spans = vec![Span::styled(layout.name.clone(), name_style)];
            let mut used = layout.name.len();
            if let Some(target) = resolution.alias_target(&layout.name) {
                let arrow = format!(" → {}", target);
                used += arrow.chars().count();
                spans.push(Span::styled(arrow, Style::default().fg(DEFAULT_THEME.comment)));
            }
            let padding = content_width.saturating_sub(used + size.len()).max(1);
            spans.push(Span::raw(" ".repeat(padding)));
            spans.push(Span::styled(size, Style::default().fg(DEFAULT_THEME.number)));

            let mut style = Style::default();
            if i == selected {
                style = style.bg(DEFAULT_THEME.current_line_bg);
                if is_focused {
                    style = style.add_modifier(Modifier::BOLD);
                }
            }
            ListItem::new(Line::from(spans)).style(style)
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
