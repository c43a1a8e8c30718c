//! App: component-based event loop for the record browser.
//!
//! - `App` owns the components and `AppState` (read-only for components).
//! - Terminal input is read on a blocking task and forwarded as `AppMessage`s
//!   over a tokio mpsc channel, together with WARN/ERROR log events.
//! - A fixed-rate frame timer advances the scene and redraws while anything
//!   is moving.

use std::io;
use std::time::{Duration, Instant};

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    style::Style,
    widgets::Block,
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info, Level};

use records_proto::catalog::CatalogItem;
use records_proto::config::Config;

use crate::{
    action::Action,
    app_state::AppState,
    component::Component,
    components::{
        header::Header, help_overlay::HelpOverlay, player::Player, record_info::RecordInfo,
        record_stack::RecordStack,
    },
    log_layer::LogEvent,
    scene::ClickOutcome,
    theme::C_BG,
    widgets::toast::ToastManager,
};

// ── Internal event bus ────────────────────────────────────────────────────────

enum AppMessage {
    /// Terminal event and the moment it was read.
    Event(Event, Instant),
    Log(LogEvent),
}

/// Longest frame step fed to the scene; a stalled terminal resumes smoothly.
const MAX_FRAME_DT: f32 = 0.25;
const PAGE_RECORDS: f32 = 10.0;
const MAX_FPS: u32 = 240;

/// Which component currently owns the mouse (topmost first).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Help,
    Player,
    Header,
    Stack,
}

pub struct App {
    state: AppState,
    header: Header,
    stack: RecordStack,
    info: RecordInfo,
    player: Player,
    help: HelpOverlay,
    toast: ToastManager,
    /// Layer that received the last button press; drags and the release go
    /// to it wherever they land.
    capture: Option<Layer>,
    /// Read time of the terminal event being handled; drag velocity is
    /// measured against it, not against when a queued batch is drained.
    event_at: Instant,
    fps: u32,
    should_quit: bool,
}

impl App {
    pub fn new(config: &Config, records: &[CatalogItem], source: &'static str) -> Self {
        let state = AppState::new(records, config.scene.clone(), config.ui.clone(), source);
        info!(
            "Loaded {} records ({} stack slots) from {}",
            state.record_count,
            state.entries.len(),
            source
        );
        let mut toast = ToastManager::new();
        toast.info(format!("{} records from {}", state.record_count, source));
        Self {
            state,
            header: Header::new(),
            stack: RecordStack::new(),
            info: RecordInfo::new(),
            player: Player::new(),
            help: HelpOverlay::new(),
            toast,
            capture: None,
            event_at: Instant::now(),
            fps: config.ui.fps.clamp(1, MAX_FPS),
            should_quit: false,
        }
    }

    // ── Main run loop ─────────────────────────────────────────────────────────

    pub async fn run(mut self, mut log_rx: mpsc::UnboundedReceiver<LogEvent>) -> anyhow::Result<()> {
        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        let size = terminal.size()?;
        debug!("run(): terminal created, size={:?}", size);
        self.dispatch(Action::Resize(size.width, size.height));

        let (tx, mut rx) = mpsc::channel::<AppMessage>(1024);

        // ── Background task: keyboard/mouse events ────────────────────────────
        let event_tx = tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    let msg = AppMessage::Event(ev, Instant::now());
                    if event_tx.blocking_send(msg).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // ── Background task: log events → toasts ──────────────────────────────
        let log_tx = tx.clone();
        tokio::spawn(async move {
            while let Some(event) = log_rx.recv().await {
                if log_tx.send(AppMessage::Log(event)).await.is_err() {
                    break;
                }
            }
        });

        // ── Periodic timers ───────────────────────────────────────────────────
        let mut frame_tick =
            tokio::time::interval(Duration::from_millis(1000 / self.fps as u64));
        frame_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // Toast expiry check
        let mut toast_tick = tokio::time::interval(Duration::from_millis(100));
        toast_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // ── Main loop ─────────────────────────────────────────────────────────
        let mut needs_redraw = true;
        let mut last_frame = Instant::now();
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            needs_redraw = false;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    const MAX_DRAIN: usize = 256;
                    let mut redraw = self.handle_message(msg);
                    let mut drained = 0usize;
                    while drained < MAX_DRAIN {
                        let next = match rx.try_recv() {
                            Ok(v) => v,
                            Err(_) => break,
                        };
                        drained += 1;
                        redraw |= self.handle_message(next);
                    }
                    needs_redraw = redraw;
                }

                _ = frame_tick.tick() => {
                    let now = Instant::now();
                    let dt = now.duration_since(last_frame).as_secs_f32().min(MAX_FRAME_DT);
                    last_frame = now;

                    let animating = self.state.scene.tick(dt);
                    for action in self.player.tick(&self.state) {
                        self.dispatch(action);
                    }
                    needs_redraw = animating || self.player.is_visible();
                }

                _ = toast_tick.tick() => {
                    if self.toast.tick() {
                        needs_redraw = true;
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
        info!("records exiting");

        Ok(())
    }

    /// Returns whether the message changed anything visible.
    fn handle_message(&mut self, msg: AppMessage) -> bool {
        if let AppMessage::Event(_, at) = &msg {
            self.event_at = *at;
        }
        match msg {
            AppMessage::Event(Event::Key(key), _) => {
                for action in self.handle_key(key) {
                    self.dispatch(action);
                }
                true
            }
            AppMessage::Event(Event::Mouse(mouse), _) => {
                for action in self.handle_mouse(mouse) {
                    self.dispatch(action);
                }
                true
            }
            AppMessage::Event(Event::Resize(w, h), _) => {
                self.dispatch(Action::Resize(w, h));
                true
            }
            AppMessage::Event(..) => false,
            AppMessage::Log(event) => {
                if event.level == Level::ERROR {
                    self.toast.error(event.message);
                } else {
                    self.toast.warning(event.message);
                }
                true
            }
        }
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return vec![Action::Quit];
        }
        if self.help.visible {
            return self.help.handle_key(key, &self.state);
        }

        // One record per key press, in raw wheel units
        let config = self.state.scene.config();
        let record = if config.wheel_sensitivity > 0.0 {
            config.spacing / config.wheel_sensitivity
        } else {
            0.0
        };
        let (min, max) = self.state.scene.scroll().bounds();
        let everything = if config.wheel_sensitivity > 0.0 {
            (max - min) / config.wheel_sensitivity
        } else {
            0.0
        };

        match key.code {
            KeyCode::Char('q') => vec![Action::Quit],
            KeyCode::Char('?') => vec![Action::ToggleHelp],
            KeyCode::Esc => vec![Action::Deselect],
            KeyCode::Enter => vec![Action::SelectFocused],
            KeyCode::Up | KeyCode::Char('k') => vec![Action::Scroll(-record)],
            KeyCode::Down | KeyCode::Char('j') => vec![Action::Scroll(record)],
            KeyCode::PageUp => vec![Action::Scroll(-record * PAGE_RECORDS)],
            KeyCode::PageDown => vec![Action::Scroll(record * PAGE_RECORDS)],
            KeyCode::Home => vec![Action::Scroll(-everything)],
            KeyCode::End => vec![Action::Scroll(everything)],
            _ => vec![],
        }
    }

    fn layer_at(&self, col: u16, row: u16) -> Option<Layer> {
        if self.help.hit(col, row) {
            Some(Layer::Help)
        } else if self.player.hit(col, row) {
            Some(Layer::Player)
        } else if self.header.hit(col, row) {
            Some(Layer::Header)
        } else if self.stack.hit(col, row) {
            Some(Layer::Stack)
        } else {
            None
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent) -> Vec<Action> {
        let layer = match event.kind {
            MouseEventKind::Drag(_) | MouseEventKind::Up(_) if self.capture.is_some() => {
                self.capture
            }
            _ => self.layer_at(event.column, event.row),
        };
        match event.kind {
            MouseEventKind::Down(_) => self.capture = layer,
            MouseEventKind::Up(_) => self.capture = None,
            _ => {}
        }

        let s = &self.state;
        let mut actions = match layer {
            Some(Layer::Help) => self.help.handle_mouse(event, s),
            Some(Layer::Player) => self.player.handle_mouse(event, s),
            Some(Layer::Header) => self.header.handle_mouse(event, s),
            Some(Layer::Stack) => self.stack.handle_mouse(event, s),
            None => vec![],
        };

        // Leaving the stack clears the hover highlight
        if event.kind == MouseEventKind::Moved
            && layer != Some(Layer::Stack)
            && s.scene.hovered().is_some()
        {
            actions.push(Action::Hover(None));
        }
        actions
    }

    // ── Dispatch ──────────────────────────────────────────────────────────────

    fn dispatch(&mut self, action: Action) {
        let scene = &mut self.state.scene;
        match action {
            Action::Scroll(delta) => scene.wheel(delta),
            Action::DragStart { y } => scene.drag_start(y as f32, self.event_at),
            Action::DragMove { y } => scene.drag_move(y as f32, self.event_at),
            Action::DragEnd => scene.drag_end(self.event_at),
            Action::Hover(position) => scene.hover(position),
            Action::Click(position) => {
                let outcome = scene.click(position);
                self.log_click(outcome);
            }
            Action::ClickBackground | Action::Deselect => {
                let outcome = scene.deselect();
                self.log_click(outcome);
            }
            Action::SelectFocused => {
                if let Some(position) = self.state.record_near_focus() {
                    let outcome = self.state.scene.click(position);
                    self.log_click(outcome);
                }
            }
            Action::ToggleHelp => self.help.toggle(),
            Action::Quit => self.should_quit = true,
            Action::Resize(width, _) => {
                let compact = width < self.state.ui.compact_width;
                scene.set_compact(compact);
            }
        }
    }

    fn log_click(&self, outcome: ClickOutcome) {
        match outcome {
            ClickOutcome::Selected(position) => {
                if let Some(record) = self.state.record(position) {
                    info!("Selected {}", record.display_title());
                }
            }
            ClickOutcome::Deselected(position) => debug!("Deselected position {}", position),
            ClickOutcome::Ignored => {}
        }
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(C_BG)), area);

        let [header_area, stack_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(area);

        self.stack.draw(frame, stack_area, &self.state);
        self.header.draw(frame, header_area, &self.state);
        self.info.draw(frame, stack_area, &self.state);
        self.player.draw(frame, stack_area, &self.state);
        self.toast.draw(frame, area);
        self.help.draw(frame, area, &self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::crossterm::event::MouseButton;
    use records_proto::catalog::mock_catalog;

    fn app() -> App {
        App::new(&Config::default(), &mock_catalog(), "cache")
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn press(app: &mut App, code: KeyCode) {
        for action in app.handle_key(key(code)) {
            app.dispatch(action);
        }
    }

    #[test]
    fn test_enter_selects_record_near_focus_and_esc_dismisses() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state.scene.selection(), Some(1));

        for _ in 0..600 {
            app.state.scene.tick(1.0 / 30.0);
        }
        assert_eq!(app.state.scene.presented(), Some(1));

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state.scene.presented(), None);
        assert_eq!(app.state.scene.selection(), Some(1));
    }

    #[test]
    fn test_arrow_keys_scroll_one_record() {
        let mut app = app();
        let spacing = app.state.scene.config().spacing;
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('j'));
        assert!((app.state.scene.focus() - 2.0 * spacing).abs() < 1e-4);
        press(&mut app, KeyCode::Up);
        assert!((app.state.scene.focus() - spacing).abs() < 1e-4);
        press(&mut app, KeyCode::End);
        let (_, max) = app.state.scene.scroll().bounds();
        assert_eq!(app.state.scene.focus(), max);
    }

    #[test]
    fn test_help_swallows_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.help.visible);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.state.scene.focus(), 0.0);
        press(&mut app, KeyCode::Esc);
        assert!(!app.help.visible);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(app.handle_key(ctrl_c), [Action::Quit]);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_narrow_terminal_is_compact() {
        let mut app = app();
        app.dispatch(Action::Resize(60, 30));
        assert!(app.state.scene.is_compact());
        app.dispatch(Action::Resize(120, 30));
        assert!(!app.state.scene.is_compact());
    }

    fn render(app: &mut App) {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
    }

    fn mouse_at(app: &mut App, kind: MouseEventKind, row: u16, at: Instant) {
        let event = MouseEvent {
            kind,
            column: 5,
            row,
            modifiers: KeyModifiers::NONE,
        };
        app.handle_message(AppMessage::Event(Event::Mouse(event), at));
    }

    #[test]
    fn test_queued_drag_uses_read_times() {
        let mut app = app();
        render(&mut app);
        let max_velocity = app.state.scene.config().max_velocity;

        // Read 50µs apart, handled later in one batch
        let t0 = Instant::now();
        mouse_at(&mut app, MouseEventKind::Down(MouseButton::Left), 25, t0);
        mouse_at(&mut app, MouseEventKind::Drag(MouseButton::Left), 24, t0 + Duration::from_micros(50));
        mouse_at(&mut app, MouseEventKind::Up(MouseButton::Left), 24, t0 + Duration::from_millis(1));

        let released_at = app.state.scene.focus();
        app.state.scene.tick(1.0 / 30.0);
        let travelled = app.state.scene.focus() - released_at;
        assert!(travelled > 0.0);
        assert!(travelled <= max_velocity / 30.0 + 1e-4);
    }

    #[test]
    fn test_drag_held_before_release_does_not_fling() {
        let mut app = app();
        render(&mut app);

        let t0 = Instant::now();
        mouse_at(&mut app, MouseEventKind::Down(MouseButton::Left), 25, t0);
        mouse_at(&mut app, MouseEventKind::Drag(MouseButton::Left), 20, t0 + Duration::from_millis(40));
        mouse_at(&mut app, MouseEventKind::Up(MouseButton::Left), 20, t0 + Duration::from_millis(600));

        let released_at = app.state.scene.focus();
        assert!(released_at > 0.0);
        app.state.scene.tick(1.0 / 30.0);
        assert_eq!(app.state.scene.focus(), released_at);
    }

    #[test]
    fn test_frame_rate_is_clamped() {
        let mut config = Config::default();
        config.ui.fps = 5000;
        assert_eq!(App::new(&config, &mock_catalog(), "cache").fps, MAX_FPS);
        config.ui.fps = 0;
        assert_eq!(App::new(&config, &mock_catalog(), "cache").fps, 1);
    }

    #[test]
    fn test_log_events_become_toasts() {
        let mut app = app();
        app.handle_message(AppMessage::Log(LogEvent {
            level: Level::WARN,
            message: "DISCOGS_TOKEN not set, using mock data".into(),
        }));
        // The startup summary plus the warning
        assert_eq!(app.toast.len(), 2);
    }
}
