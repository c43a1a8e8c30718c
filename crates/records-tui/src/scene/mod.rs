//! Scene controller: scroll, selection and per-item animation for the stack.
//!
//! Items are addressed by their stack position. Only items near the scroll
//! focus are mounted (hold animation state); the selected item stays mounted
//! wherever it is. At most one item is ever outside `Stage::Idle`, and a
//! click only counts while the scene is neutral: nothing selected, or the
//! selection fully revealed.

pub mod scroll;
pub mod stage;
pub mod transform;
pub mod wave;

use std::collections::BTreeMap;
use std::time::Instant;

use cgmath::{Vector3, Zero};
use records_proto::config::SceneConfig;
use tracing::debug;

pub use scroll::ScrollState;
pub use stage::{Stage, StageInput};
pub use transform::Transform;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemState {
    pub transform: Transform,
    pub stage: Stage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Selection {
    index: usize,
    /// Cleared on deselect; the item then animates home before the
    /// selection is dropped.
    wanted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Selected(usize),
    Deselected(usize),
    Ignored,
}

pub struct SceneController {
    config: SceneConfig,
    total: usize,
    scroll: ScrollState,
    mounted: BTreeMap<usize, ItemState>,
    selection: Option<Selection>,
    hovered: Option<usize>,
    compact: bool,
}

impl SceneController {
    pub fn new(config: SceneConfig, total: usize) -> Self {
        let scroll = ScrollState::new(config.min_offset, total as f32 * config.spacing);
        let mut scene = Self {
            config,
            total,
            scroll,
            mounted: BTreeMap::new(),
            selection: None,
            hovered: None,
            compact: false,
        };
        scene.sync_mounted();
        scene
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn scroll(&self) -> &ScrollState {
        &self.scroll
    }

    pub fn focus(&self) -> f32 {
        self.scroll.offset()
    }

    pub fn slot(&self, index: usize) -> f32 {
        index as f32 * self.config.spacing
    }

    pub fn is_compact(&self) -> bool {
        self.compact
    }

    pub fn set_compact(&mut self, compact: bool) {
        if self.compact != compact {
            debug!("scene: compact = {}", compact);
            self.compact = compact;
        }
    }

    // ── Input ────────────────────────────────────────────────────────────────

    /// Raw wheel delta; scaled by `wheel_sensitivity`.
    pub fn wheel(&mut self, delta: f32) {
        self.scroll.wheel(delta * self.config.wheel_sensitivity);
    }

    pub fn drag_start(&mut self, y: f32, now: Instant) {
        self.scroll.drag_start(y, now);
    }

    pub fn drag_move(&mut self, y: f32, now: Instant) {
        self.scroll.drag_move(
            y,
            now,
            self.config.drag_sensitivity,
            self.config.max_velocity,
        );
    }

    pub fn drag_end(&mut self, now: Instant) {
        self.scroll.drag_end(now);
    }

    pub fn hover(&mut self, index: Option<usize>) {
        self.hovered = index;
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    // ── Selection ────────────────────────────────────────────────────────────

    pub fn is_neutral(&self) -> bool {
        match self.selection {
            None => true,
            Some(sel) => sel.wanted && self.stage(sel.index) == Stage::Revealed,
        }
    }

    /// Click on the item at `index`. Starts a selection when nothing is
    /// selected; dismisses the revealed item otherwise (whichever item was
    /// clicked); ignored mid-animation.
    pub fn click(&mut self, index: usize) -> ClickOutcome {
        if !self.is_neutral() {
            debug!("scene: click on {} ignored while animating", index);
            return ClickOutcome::Ignored;
        }
        match self.selection {
            Some(_) => self.deselect(),
            None if index < self.total => {
                self.selection = Some(Selection {
                    index,
                    wanted: true,
                });
                self.mount(index);
                ClickOutcome::Selected(index)
            }
            None => ClickOutcome::Ignored,
        }
    }

    /// Background click or Esc: dismiss the revealed item, if any.
    pub fn deselect(&mut self) -> ClickOutcome {
        let Some(sel) = self.selection else {
            return ClickOutcome::Ignored;
        };
        if !sel.wanted || self.stage(sel.index) != Stage::Revealed {
            return ClickOutcome::Ignored;
        }
        self.selection = Some(Selection {
            wanted: false,
            ..sel
        });
        ClickOutcome::Deselected(sel.index)
    }

    /// The item outside `Idle`, if any (including while it returns home).
    pub fn selection(&self) -> Option<usize> {
        self.selection.map(|s| s.index)
    }

    /// The selected item once it is fully revealed and still wanted.
    pub fn presented(&self) -> Option<usize> {
        self.selection
            .filter(|s| s.wanted && self.stage(s.index) == Stage::Revealed)
            .map(|s| s.index)
    }

    pub fn stage(&self, index: usize) -> Stage {
        self.mounted
            .get(&index)
            .map(|item| item.stage)
            .unwrap_or_default()
    }

    pub fn item(&self, index: usize) -> Option<&ItemState> {
        self.mounted.get(&index)
    }

    /// Mounted items in stack order.
    pub fn items(&self) -> impl Iterator<Item = (usize, &ItemState)> {
        self.mounted.iter().map(|(index, item)| (*index, item))
    }

    // ── Frame update ─────────────────────────────────────────────────────────

    /// Advance inertia, virtualization and every mounted transform by `dt`
    /// seconds. Returns whether anything is still moving.
    pub fn tick(&mut self, dt: f32) -> bool {
        let dt = dt.max(0.0);
        let moved = self
            .scroll
            .tick(dt, self.config.friction, self.config.stop_velocity);
        let mut animating = moved || self.scroll.velocity() != 0.0;
        self.sync_mounted();

        let rate = self.config.lerp_rate;
        let epsilon = self.config.arrive_epsilon;
        let compact = self.compact;
        let indices: Vec<usize> = self.mounted.keys().copied().collect();

        for index in indices {
            let stage = self.stage(index);
            let target = self.target(index, stage);
            let selection = self.selection.filter(|s| s.index == index);
            let Some(item) = self.mounted.get_mut(&index) else {
                continue;
            };

            item.transform.approach(&target, rate, dt);
            let arrived = item.transform.distance(&target) < epsilon;
            animating |= !arrived;

            let Some(sel) = selection else {
                continue;
            };
            let next = item.stage.advance(StageInput {
                selected: sel.wanted,
                arrived,
                compact,
            });
            if next != item.stage {
                debug!("scene: item {} {} → {}", index, item.stage.label(), next.label());
                item.stage = next;
                animating = true;
                if next == Stage::Idle {
                    self.selection = None;
                }
            }
        }

        animating
    }

    /// Where the item at `index` is heading while in `stage`.
    pub fn target(&self, index: usize, stage: Stage) -> Transform {
        let c = &self.config;
        let slot = self.slot(index);
        let focus = self.focus();
        let lean = Vector3::new(c.lean_angle, 0.0, 0.0);
        let slide = if self.compact { 0.0 } else { c.slide_out };

        match stage {
            Stage::Idle => {
                let g = wave::proximity(slot - focus, c.wave_sigma);
                let hover = if self.hovered == Some(index) {
                    c.hover_lift
                } else {
                    0.0
                };
                Transform::new(
                    Vector3::new(0.0, slot, c.wave_amplitude * g + hover),
                    lean,
                    1.0 + c.wave_scale * g,
                    0.0,
                )
            }
            Stage::Lifting => Transform::new(Vector3::new(0.0, slot, c.lift_z), lean, 1.0, 0.0),
            Stage::Centering | Stage::Concealing => Transform::new(
                Vector3::new(0.0, focus, c.center_z),
                Vector3::zero(),
                c.center_scale,
                0.0,
            ),
            Stage::Sliding | Stage::Revealed => Transform::new(
                Vector3::new(0.0, focus, c.center_z),
                Vector3::zero(),
                c.center_scale,
                slide,
            ),
            Stage::Returning => Transform::new(Vector3::new(0.0, slot, 0.0), lean, 1.0, 0.0),
        }
    }

    // ── Virtualization ───────────────────────────────────────────────────────

    fn in_view(&self, index: usize) -> bool {
        (self.slot(index) - self.focus()).abs() <= self.config.view_distance
    }

    fn mount(&mut self, index: usize) {
        if !self.mounted.contains_key(&index) {
            let transform = self.target(index, Stage::Idle);
            self.mounted.insert(
                index,
                ItemState {
                    transform,
                    stage: Stage::Idle,
                },
            );
        }
    }

    fn sync_mounted(&mut self) {
        let selected = self.selection();
        let stale: Vec<usize> = self
            .mounted
            .keys()
            .copied()
            .filter(|&i| Some(i) != selected && !self.in_view(i))
            .collect();
        for index in stale {
            self.mounted.remove(&index);
        }

        if self.total == 0 {
            return;
        }
        let last = self.total - 1;
        let (lo, hi) = if self.config.spacing > 0.0 {
            let focus = self.focus();
            let reach = self.config.view_distance;
            let lo = ((focus - reach) / self.config.spacing).floor().max(0.0) as usize;
            let hi = ((focus + reach) / self.config.spacing).ceil().max(0.0) as usize;
            (lo, hi.min(last))
        } else {
            (0, last)
        };

        for index in lo..=hi {
            if self.in_view(index) {
                self.mount(index);
            }
        }
    }
}
