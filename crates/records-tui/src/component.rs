//! Component trait: the interface every UI panel implements.
//!
//! Components read `AppState`, return `Vec<Action>` and never mutate shared
//! state directly; the App dispatches their actions.

use ratatui::crossterm::event::{KeyEvent, MouseEvent};
use ratatui::{layout::Rect, Frame};

use crate::action::Action;
use crate::app_state::AppState;

pub trait Component {
    /// Handle a key event. Returns actions to be dispatched.
    fn handle_key(&mut self, _key: KeyEvent, _state: &AppState) -> Vec<Action> {
        Vec::new()
    }

    /// Handle a mouse event that landed inside this component.
    fn handle_mouse(&mut self, event: MouseEvent, state: &AppState) -> Vec<Action>;

    /// Whether the last drawn frame put anything at `(col, row)`.
    fn hit(&self, col: u16, row: u16) -> bool;

    /// Called once per frame, after the scene has advanced.
    fn tick(&mut self, _state: &AppState) -> Vec<Action> {
        Vec::new()
    }

    /// Render the component into `area`.
    fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState);
}

/// Point-in-rect test shared by every component's hit map.
pub fn hit(r: Rect, col: u16, row: u16) -> bool {
    col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height
}
