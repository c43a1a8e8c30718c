//! Player component: now-playing bar for the revealed record, bottom centre.
//!
//! Holds on to the last record for `LINGER` after the selection closes so
//! the bar can fade out instead of vanishing.

use std::time::{Duration, Instant};

use ratatui::crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use records_proto::catalog::CatalogItem;

use crate::{
    action::Action,
    app_state::AppState,
    component::{hit, Component},
    theme::{mix, truncate, C_ACCENT, C_BG, C_PANEL_BORDER, C_PRIMARY, C_SECONDARY},
};

pub const LINGER: Duration = Duration::from_millis(400);
const CLOSE: &str = " ✕ ";

pub struct Player {
    shown: Option<CatalogItem>,
    closed_at: Option<Instant>,
    bar: Rect,
    close: Rect,
}

impl Player {
    pub fn new() -> Self {
        Self {
            shown: None,
            closed_at: None,
            bar: Rect::default(),
            close: Rect::default(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.shown.is_some()
    }

    pub fn is_closing(&self) -> bool {
        self.closed_at.is_some()
    }

    /// Track the presented record; keep the previous one for `LINGER`.
    pub fn update(&mut self, presented: Option<&CatalogItem>, now: Instant) {
        match presented {
            Some(record) => {
                if self.shown.as_ref() != Some(record) {
                    self.shown = Some(record.clone());
                }
                self.closed_at = None;
            }
            None if self.shown.is_some() => {
                let closed = *self.closed_at.get_or_insert(now);
                if now.saturating_duration_since(closed) >= LINGER {
                    self.shown = None;
                    self.closed_at = None;
                }
            }
            None => {}
        }
    }

    /// 1.0 while open, fading to 0 over the linger period.
    fn opacity(&self, now: Instant) -> f32 {
        match self.closed_at {
            Some(closed) => {
                1.0 - now.saturating_duration_since(closed).as_secs_f32() / LINGER.as_secs_f32()
            }
            None => 1.0,
        }
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Player {
    fn handle_mouse(&mut self, event: MouseEvent, _state: &AppState) -> Vec<Action> {
        match event.kind {
            MouseEventKind::Up(MouseButton::Left)
                if !self.is_closing() && hit(self.close, event.column, event.row) =>
            {
                vec![Action::Deselect]
            }
            _ => vec![],
        }
    }

    fn hit(&self, col: u16, row: u16) -> bool {
        self.is_visible() && hit(self.bar, col, row)
    }

    fn tick(&mut self, state: &AppState) -> Vec<Action> {
        let presented = state.scene.presented().and_then(|p| state.record(p));
        self.update(presented, Instant::now());
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        self.bar = Rect::default();
        self.close = Rect::default();
        let Some(record) = &self.shown else {
            return;
        };
        if area.height < 3 || area.width < 12 {
            return;
        }

        let fade = self.opacity(Instant::now()).clamp(0.0, 1.0);
        let width = if state.scene.is_compact() {
            area.width
        } else {
            area.width.min(64)
        };
        let bar = Rect::new(
            area.x + (area.width - width) / 2,
            area.y + area.height - 3,
            width,
            3,
        );

        let year = if record.year > 0 {
            format!(" ({})", record.year)
        } else {
            String::new()
        };
        let room = (width as usize).saturating_sub(4 + CLOSE.width());
        let text = truncate(&format!("♪ {} · {}{}", record.artist, record.title, year), room);
        let pad = room.saturating_sub(text.width());

        let line = Line::from(vec![
            Span::styled(
                format!(" {}", text),
                Style::default()
                    .fg(mix(C_BG, C_PRIMARY, fade))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" ".repeat(pad + 1)),
            Span::styled(CLOSE, Style::default().fg(mix(C_BG, C_ACCENT, fade))),
        ]);

        frame.render_widget(Clear, bar);
        frame.render_widget(
            Paragraph::new(line).block(
                Block::bordered()
                    .border_style(Style::default().fg(mix(C_BG, C_SECONDARY, fade)))
                    .style(Style::default().bg(mix(C_BG, C_PANEL_BORDER, fade))),
            ),
            bar,
        );

        self.bar = bar;
        self.close = Rect::new(
            bar.x + bar.width.saturating_sub(1 + CLOSE.width() as u16),
            bar.y + 1,
            CLOSE.width() as u16,
            1,
        );
    }
}
