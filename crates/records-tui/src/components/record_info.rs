//! RecordInfo component: details of the hovered (else selected) record,
//! bottom right. Display only; the pointer passes through to the stack.

use ratatui::crossterm::event::MouseEvent;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph},
    Frame,
};

use crate::{
    action::Action,
    app_state::AppState,
    component::Component,
    theme::{style_border, style_muted, style_secondary, truncate, C_BG, C_PRIMARY},
};

/// Rows kept free at the bottom for the player.
const PLAYER_BAND: u16 = 4;

pub struct RecordInfo;

impl RecordInfo {
    pub fn new() -> Self {
        Self
    }

    /// Bottom-right box inside `area`, above the player band.
    fn rect(area: Rect, lines: u16, compact: bool) -> Rect {
        let width = if compact { area.width / 2 } else { 36 }.min(area.width);
        let height = (lines + 2).min(area.height);
        Rect::new(
            area.x + area.width - width,
            (area.y + area.height).saturating_sub(height + PLAYER_BAND).max(area.y),
            width,
            height,
        )
    }
}

impl Default for RecordInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for RecordInfo {
    fn handle_mouse(&mut self, _event: MouseEvent, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn hit(&self, _col: u16, _row: u16) -> bool {
        false
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let Some(record) = state.info_record() else {
            return;
        };
        let compact = state.scene.is_compact();
        let width = Self::rect(area, 0, compact).width.saturating_sub(2) as usize;
        let mut lines = vec![
            Line::from(Span::styled(
                truncate(&record.title, width),
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(truncate(&record.artist, width), style_secondary())),
        ];
        if record.year > 0 {
            lines.push(Line::from(Span::styled(record.year.to_string(), style_muted())));
        }
        lines.push(Line::from(Span::styled(truncate(&record.genre, width), style_muted())));

        let rect = Self::rect(area, lines.len() as u16, compact);
        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(lines).block(
                Block::bordered()
                    .border_style(style_border())
                    .style(Style::default().bg(C_BG)),
            ),
            rect,
        );
    }
}
