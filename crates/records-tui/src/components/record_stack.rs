//! RecordStack component: the scrolling stack of sleeves and genre dividers.
//!
//! Each mounted item is projected from its animated transform: `y` picks the
//! row (one row per stack slot, focus on the middle row), `z` indents the row
//! toward the viewer, `scale` stretches its width. The selected record, from
//! `Centering` on, is drawn as a large sleeve panel with the vinyl sliding out
//! to its right. Hit-testing uses exactly the rectangles drawn last frame.

use ratatui::crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Clear, Paragraph},
    Frame,
};

use records_proto::catalog::CatalogItem;

use crate::{
    action::Action,
    app_state::{AppState, Entry},
    component::{hit, Component},
    scene::{wave, ItemState, Transform},
    theme::{
        mix, style_muted, truncate, C_BG, C_DIVIDER, C_HOVER, C_LABEL_MARK, C_PANEL_BORDER,
        C_PRIMARY, C_SECONDARY, C_SLEEVE, C_SLEEVE_NEAR, C_VINYL, C_VINYL_GROOVE,
    },
};

/// Columns of indent per unit of `z`.
const INDENT_PER_Z: f32 = 4.0;
/// Share of the area width a resting sleeve row spans.
const ROW_WIDTH: f32 = 0.55;
/// Share of the area height the presented sleeve spans at `center_scale`.
const PANEL_HEIGHT: f32 = 0.7;

#[derive(Debug, Clone, Copy)]
struct Press {
    row: u16,
    moved: bool,
}

pub struct RecordStack {
    area: Rect,
    /// Record rows drawn last frame, in stack order.
    rows: Vec<(Rect, usize)>,
    /// The presented sleeve (and disc), drawn over the rows.
    panel: Option<(Rect, usize)>,
    press: Option<Press>,
}

impl RecordStack {
    pub fn new() -> Self {
        Self {
            area: Rect::default(),
            rows: Vec::new(),
            panel: None,
            press: None,
        }
    }

    /// Stack position of the record drawn at `(col, row)`, topmost first.
    pub fn record_at(&self, col: u16, row: u16) -> Option<usize> {
        if let Some((rect, position)) = self.panel {
            if hit(rect, col, row) {
                return Some(position);
            }
        }
        self.rows
            .iter()
            .rev()
            .find(|(rect, _)| hit(*rect, col, row))
            .map(|(_, position)| *position)
    }

    fn row_for(&self, y: f32, state: &AppState) -> i32 {
        let spacing = state.scene.config().spacing.max(f32::EPSILON);
        let centre = self.area.y as f32 + (self.area.height / 2) as f32;
        (centre + (y - state.scene.focus()) / spacing).round() as i32
    }

    fn draw_divider(&self, frame: &mut Frame, genre: &str, row: u16, t: &Transform) {
        let width = self.row_width(t.scale);
        let x = self.row_x(width, t.position.z);
        let label = format!("── {} ", truncate(genre, width.saturating_sub(4) as usize));
        let fill = (width as usize).saturating_sub(unicode_width::UnicodeWidthStr::width(label.as_str()));
        let line = Line::from(Span::styled(
            format!("{}{}", label, "─".repeat(fill)),
            Style::default().fg(C_DIVIDER).add_modifier(Modifier::BOLD),
        ));
        let rect = Rect::new(x, row, width, 1).intersection(self.area);
        frame.render_widget(Paragraph::new(line), rect);
    }

    fn draw_row(
        &mut self,
        frame: &mut Frame,
        record: &CatalogItem,
        position: usize,
        row: u16,
        t: &Transform,
        state: &AppState,
    ) {
        let config = state.scene.config();
        let width = self.row_width(t.scale);
        let x = self.row_x(width, t.position.z);
        let rect = Rect::new(x, row, width, 1).intersection(self.area);
        if rect.is_empty() {
            return;
        }

        // 0 at rest, 1 at the peak of the proximity wave
        let near = if config.wave_scale > 0.0 {
            ((t.scale - 1.0) / config.wave_scale).clamp(0.0, 1.0)
        } else {
            wave::proximity(t.position.y - state.scene.focus(), config.wave_sigma)
        };
        let hovered = state.scene.hovered() == Some(position);
        let fg = if hovered {
            C_HOVER
        } else {
            mix(C_SLEEVE, C_SLEEVE_NEAR, near)
        };
        let bg = mix(C_BG, C_PANEL_BORDER, near);

        // Leaning sleeves show their spine at an angle
        let edge = if t.rotation.x > config.lean_angle * 0.5 {
            "╱"
        } else {
            "▐"
        };
        let marker = if record.is_label_image { " ◎" } else { "" };
        let text_width = (rect.width as usize).saturating_sub(2 + marker.chars().count());
        let text = truncate(
            &format!("{} · {}", record.title, record.artist),
            text_width,
        );

        let line = Line::from(vec![
            Span::styled(edge, Style::default().fg(C_SECONDARY)),
            Span::styled(format!(" {}", text), Style::default().fg(fg)),
            Span::styled(marker, Style::default().fg(C_LABEL_MARK)),
        ]);
        frame.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), rect);
        self.rows.push((rect, position));
    }

    fn draw_panel(
        &mut self,
        frame: &mut Frame,
        record: &CatalogItem,
        position: usize,
        item: &ItemState,
        state: &AppState,
    ) {
        let config = state.scene.config();
        let t = &item.transform;
        let area = self.area;

        let grow = t.scale / config.center_scale.max(f32::EPSILON);
        let height = ((area.height as f32 * PANEL_HEIGHT * grow).round() as u16)
            .clamp(5.min(area.height), area.height);
        // Terminal cells are about twice as tall as wide
        let width = (height * 2).min(area.width * 2 / 3).max(10.min(area.width));

        let slide = if config.slide_out > 0.0 {
            (t.slide / config.slide_out).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let slide_cols = (slide * width as f32 / 2.0).round() as u16;

        let centre_row = self.row_for(t.position.y, state);
        let top = (centre_row - height as i32 / 2).max(area.y as i32) as u16;
        let left = (area.x + area.width / 2).saturating_sub(width / 2 + slide_cols / 2);

        let sleeve = Rect::new(left, top, width, height).intersection(area);
        let disc = Rect::new(left + slide_cols, top, width, height).intersection(area);

        if slide_cols > 0 && !disc.is_empty() {
            frame.render_widget(Clear, disc);
            let grooves = Style::default().fg(C_VINYL_GROOVE).bg(C_VINYL);
            let mut lines = vec![Line::from(""); (disc.height.saturating_sub(2) / 2) as usize];
            lines.push(Line::from(Span::styled(
                "◉",
                Style::default().fg(C_LABEL_MARK).bg(C_VINYL),
            )));
            frame.render_widget(
                Paragraph::new(lines)
                    .alignment(Alignment::Right)
                    .block(
                        Block::bordered()
                            .border_type(BorderType::Rounded)
                            .border_style(grooves)
                            .style(grooves),
                    ),
                disc,
            );
        }

        frame.render_widget(Clear, sleeve);
        let text_width = sleeve.width.saturating_sub(4) as usize;
        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                truncate(&record.title, text_width),
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                truncate(&record.artist, text_width),
                Style::default().fg(C_SECONDARY),
            )),
        ];
        if record.year > 0 {
            lines.push(Line::from(Span::styled(record.year.to_string(), style_muted())));
        }
        if record.is_label_image {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "◎ label photo",
                Style::default().fg(C_LABEL_MARK),
            )));
        }
        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center).block(
                Block::bordered()
                    .title(format!(" {} ", truncate(&record.genre, text_width)))
                    .border_style(Style::default().fg(C_SLEEVE_NEAR))
                    .style(Style::default().bg(C_PANEL_BORDER)),
            ),
            sleeve,
        );

        let covered = if slide_cols > 0 { sleeve.union(disc) } else { sleeve };
        self.panel = Some((covered, position));
    }

    fn row_width(&self, scale: f32) -> u16 {
        let base = (self.area.width as f32 * ROW_WIDTH).max(20.0);
        ((base * scale).round() as u16).min(self.area.width)
    }

    fn row_x(&self, width: u16, z: f32) -> u16 {
        let indent = (z * INDENT_PER_Z).round().max(0.0) as u16;
        let left = self.area.x + self.area.width.saturating_sub(width) / 2;
        left.saturating_add(indent)
    }
}

impl Default for RecordStack {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for RecordStack {
    fn handle_mouse(&mut self, event: MouseEvent, state: &AppState) -> Vec<Action> {
        let (col, row) = (event.column, event.row);
        let notch = state.ui.wheel_notch;

        match event.kind {
            MouseEventKind::ScrollUp => vec![Action::Scroll(-notch)],
            MouseEventKind::ScrollDown => vec![Action::Scroll(notch)],
            MouseEventKind::Down(MouseButton::Left) => {
                self.press = Some(Press { row, moved: false });
                vec![Action::DragStart { y: row }]
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(press) = self.press.as_mut() {
                    press.moved |= press.row != row;
                }
                vec![Action::DragMove { y: row }]
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let mut actions = vec![Action::DragEnd];
                // A press that never moved is a click
                if let Some(Press { moved: false, .. }) = self.press.take() {
                    actions.push(match self.record_at(col, row) {
                        Some(position) => Action::Click(position),
                        None => Action::ClickBackground,
                    });
                }
                actions
            }
            MouseEventKind::Moved => {
                let hovered = self.record_at(col, row);
                if hovered != state.scene.hovered() {
                    vec![Action::Hover(hovered)]
                } else {
                    vec![]
                }
            }
            _ => vec![],
        }
    }

    fn hit(&self, col: u16, row: u16) -> bool {
        hit(self.area, col, row)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        self.area = area;
        self.rows.clear();
        self.panel = None;
        if area.is_empty() {
            return;
        }

        let mut presented = None;
        for (position, item) in state.scene.items() {
            if item.stage.is_presented() {
                presented = Some((position, *item));
                continue;
            }
            let t = &item.transform;
            let row = self.row_for(t.position.y, state);
            if row < area.y as i32 || row >= (area.y + area.height) as i32 {
                continue;
            }
            match state.entries.get(position) {
                Some(Entry::Divider(genre)) => self.draw_divider(frame, genre, row as u16, t),
                Some(Entry::Record(record)) => {
                    self.draw_row(frame, record, position, row as u16, t, state)
                }
                None => {}
            }
        }

        if let Some((position, item)) = presented {
            if let Some(record) = state.record(position) {
                self.draw_panel(frame, record, position, &item, state);
            }
        }

        if state.scene.selection().is_none() && area.height > 2 {
            let hint = Rect::new(area.x, area.y + area.height - 1, area.width, 1);
            frame.render_widget(
                Paragraph::new(Span::styled("scroll to browse", style_muted()))
                    .alignment(Alignment::Center),
                hint,
            );
        }
    }
}
