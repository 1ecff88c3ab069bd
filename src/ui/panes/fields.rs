//! Field table rendering for the selected struct

use super::utils::{follow_selection, pane_block, visible_height};
use crate::api::StructDesc;
use crate::layout::StructLayout;
use crate::ui::theme::{DEFAULT_THEME, FIELD_PALETTE};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

/// Render offset, size, type and name of each field.
///
/// `desc` supplies field descriptions when the struct came from a
/// description (aliases share their target's).
pub fn render_fields_pane(
    frame: &mut Frame,
    area: Rect,
    layout: Option<&StructLayout>,
    desc: Option<&StructDesc>,
    selected: usize,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let Some(layout) = layout else {
        let paragraph = Paragraph::new("(nothing selected)")
            .block(pane_block(" Fields ", is_focused))
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    };

    let title = format!(" {} ({} bytes) ", layout.name, layout.size);
    let block = pane_block(&title, is_focused);

    if layout.fields.is_empty() {
        let paragraph = Paragraph::new("(no fields)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let type_width = layout
        .fields
        .iter()
        .map(|field| field.ctype.to_string().len())
        .max()
        .unwrap_or(0)
        .max(4);

    // one row is taken by the header
    let visible = visible_height(area).saturating_sub(1).max(1);
    follow_selection(scroll_offset, selected, layout.fields.len(), visible);

    let header_style = Style::default()
        .fg(DEFAULT_THEME.comment)
        .add_modifier(Modifier::BOLD);
    let mut items = vec![ListItem::new(Line::from(Span::styled(
        format!("{:>6} {:>5}  {:<type_width$}  name", "offset", "size", "type"),
        header_style,
    )))];

    for (i, field) in layout
        .fields
        .iter()
        .enumerate()
        .skip(*scroll_offset)
        .take(visible)
    {
        let marker_color = FIELD_PALETTE[i % FIELD_PALETTE.len()];
        let mut spans = vec![
            Span::styled(
                format!("{:>6} {:>5}  ", field.offset, field.size),
                Style::default().fg(DEFAULT_THEME.number),
            ),
            Span::styled(
                format!("{:<type_width$}  ", field.ctype.to_string()),
                Style::default().fg(DEFAULT_THEME.type_name),
            ),
            Span::styled(field.name.clone(), Style::default().fg(marker_color)),
        ];

        let description = desc
            .and_then(|desc| desc.fields.get(i))
            .map(|field| field.description.as_str())
            .unwrap_or("");
        if !description.is_empty() {
            spans.push(Span::styled(
                format!("  // {}", description),
                Style::default().fg(DEFAULT_THEME.comment),
            ));
        }

        let mut style = Style::default();
        if i == selected {
            style = style.bg(DEFAULT_THEME.current_line_bg);
            if is_focused {
                style = style.add_modifier(Modifier::BOLD);
            }
        }
        items.push(ListItem::new(Line::from(spans)).style(style));
    }

    frame.render_widget(List::new(items).block(block), area);
}
