//! Helpers shared by the panes

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders},
};

/// Bordered block with the focus style applied
pub(super) fn pane_block(title: &str, is_focused: bool) -> Block<'_> {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

/// Rows available inside a bordered pane, at least 1
pub(super) fn visible_height(area: Rect) -> usize {
    area.height.saturating_sub(2).max(1) as usize
}

/// Clamp a free scroll offset so the last page stays full
pub(super) fn clamp_scroll(scroll_offset: &mut usize, total_items: usize, visible: usize) {
    if total_items > visible {
        *scroll_offset = (*scroll_offset).min(total_items - visible);
    } else {
        *scroll_offset = 0;
    }
}

/// Move a scroll offset just enough to keep `selected` on screen
pub(super) fn follow_selection(
    scroll_offset: &mut usize,
    selected: usize,
    total_items: usize,
    visible: usize,
) {
    if selected < *scroll_offset {
        *scroll_offset = selected;
    } else if selected >= *scroll_offset + visible {
        *scroll_offset = selected + 1 - visible;
    }
    clamp_scroll(scroll_offset, total_items, visible);
}
