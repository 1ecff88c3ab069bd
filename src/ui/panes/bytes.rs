//! Byte map rendering
//!
//! Draws the struct as rows of 16 bytes. Each byte is tagged with a letter
//! for the field that owns it and colored per field, so packed layouts
//! (a 1-byte field followed by a 4-byte one) are easy to see.

use super::utils::{clamp_scroll, pane_block, visible_height};
use crate::layout::StructLayout;
use crate::ui::theme::{DEFAULT_THEME, FIELD_PALETTE};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

const BYTES_PER_ROW: usize = 16;

/// Number of 16-byte rows the struct spans
pub fn row_count(layout: &StructLayout) -> usize {
    layout.size.div_ceil(BYTES_PER_ROW)
}

/// Index of the field owning byte `byte`. Offsets never decrease in a
/// packed layout, so the owner is the last field starting at or before it.
pub fn byte_owner(layout: &StructLayout, byte: usize) -> Option<usize> {
    let candidate = layout
        .fields
        .partition_point(|field| field.offset <= byte)
        .checked_sub(1)?;
    let field = &layout.fields[candidate];
    (byte - field.offset < field.size).then_some(candidate)
}

/// Owners of the bytes in one row
pub fn row_owners(layout: &StructLayout, row: usize) -> Vec<Option<usize>> {
    let start = row.saturating_mul(BYTES_PER_ROW);
    let end = start.saturating_add(BYTES_PER_ROW).min(layout.size);
    (start..end).map(|byte| byte_owner(layout, byte)).collect()
}

fn field_tag(index: usize) -> char {
    const TAGS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
    TAGS.get(index).map_or('#', |&tag| tag as char)
}

/// Render the byte map of `layout`, emphasising the selected field
pub fn render_bytes_pane(
    frame: &mut Frame,
    area: Rect,
    layout: Option<&StructLayout>,
    selected_field: usize,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = pane_block(" Byte Map ", is_focused);

    let Some(layout) = layout.filter(|layout| layout.size > 0) else {
        let paragraph = Paragraph::new("(empty)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    };

    let visible = visible_height(area);
    clamp_scroll(scroll_offset, row_count(layout), visible);

    let items: Vec<ListItem> = (*scroll_offset..row_count(layout))
        .take(visible)
        .map(|row| {
            let owners = row_owners(layout, row);
            let mut spans = vec![Span::styled(
                format!("0x{:04x} ", row * BYTES_PER_ROW),
                Style::default().fg(DEFAULT_THEME.comment),
            )];

            for owner in owners.iter() {
                let (tag, color) = match owner {
                    Some(i) => (field_tag(*i), FIELD_PALETTE[i % FIELD_PALETTE.len()]),
                    None => ('.', DEFAULT_THEME.comment),
                };
                let mut style = Style::default().fg(color);
                if *owner == Some(selected_field) {
                    style = style
                        .bg(color)
                        .fg(Color::Black)
                        .add_modifier(Modifier::BOLD);
                }
                spans.push(Span::styled(format!(" {} ", tag), style));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::tests::struct_desc;
    use crate::layout::{resolve_layout, StructRegistry};

    #[test]
    fn test_byte_owners_follow_packed_offsets() {
        let desc = struct_desc(
            "Packed",
            &[("x", "float"), ("none", "char[0]"), ("n", "char"), ("y", "short")],
        );
        let layout = resolve_layout(&desc, &StructRegistry::new()).unwrap();

        assert_eq!(row_count(&layout), 1);
        assert_eq!(
            row_owners(&layout, 0),
            vec![Some(0), Some(0), Some(0), Some(0), Some(2), Some(3), Some(3)]
        );
        assert_eq!(byte_owner(&layout, 7), None);
    }

    #[test]
    fn test_large_structs_are_mapped_row_by_row() {
        let desc = struct_desc("Blob", &[("data", "char[4000000000]"), ("tail", "int")]);
        let layout = resolve_layout(&desc, &StructRegistry::new()).unwrap();

        assert_eq!(row_count(&layout), 250_000_001);
        assert_eq!(row_owners(&layout, 0), vec![Some(0); 16]);
        assert_eq!(row_owners(&layout, 250_000_000), vec![Some(1); 4]);
        assert!(row_owners(&layout, 250_000_001).is_empty());
    }

    #[test]
    fn test_field_tags() {
        assert_eq!(field_tag(0), 'a');
        assert_eq!(field_tag(26), 'A');
        assert_eq!(field_tag(60), '#');
    }
}
