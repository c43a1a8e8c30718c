//! Header component: one-row top bar.
//!
//! `← back` on the left quits, the title and collection size in the middle,
//! a help hint on the right.

use ratatui::crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::{
    action::Action,
    app_state::AppState,
    component::{hit, Component},
    theme::{style_accent, style_muted, style_secondary, C_PRIMARY},
};

const BACK: &str = " ← back ";
const HELP: &str = " ? help ";

pub struct Header {
    area: Rect,
    back: Rect,
    help: Rect,
}

impl Header {
    pub fn new() -> Self {
        Self {
            area: Rect::default(),
            back: Rect::default(),
            help: Rect::default(),
        }
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Header {
    fn handle_mouse(&mut self, event: MouseEvent, _state: &AppState) -> Vec<Action> {
        if event.kind != MouseEventKind::Up(MouseButton::Left) {
            return vec![];
        }
        if hit(self.back, event.column, event.row) {
            vec![Action::Quit]
        } else if hit(self.help, event.column, event.row) {
            vec![Action::ToggleHelp]
        } else {
            vec![]
        }
    }

    fn hit(&self, col: u16, row: u16) -> bool {
        hit(self.area, col, row)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        self.area = area;
        if area.is_empty() {
            return;
        }

        let back_w = BACK.chars().count() as u16;
        let help_w = HELP.chars().count() as u16;
        self.back = Rect::new(area.x, area.y, back_w.min(area.width), 1);
        self.help = Rect::new(
            area.x + area.width.saturating_sub(help_w),
            area.y,
            help_w.min(area.width),
            1,
        );

        frame.render_widget(Paragraph::new(Span::styled(BACK, style_accent())), self.back);

        let title = Line::from(vec![
            Span::styled(
                "records",
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {} in collection · {}", state.record_count, state.source),
                style_secondary(),
            ),
        ]);
        let middle = Rect::new(
            area.x + back_w,
            area.y,
            area.width.saturating_sub(back_w + help_w),
            1,
        );
        frame.render_widget(Paragraph::new(title).alignment(Alignment::Center), middle);

        if !state.scene.is_compact() {
            frame.render_widget(Paragraph::new(Span::styled(HELP, style_muted())), self.help);
        } else {
            self.help = Rect::default();
        }
    }
}
