//! AppState: data shared read-only with every component.

use records_proto::catalog::CatalogItem;
use records_proto::config::{SceneConfig, UiConfig};
use records_proto::layout::{build_stack, StackItem};

use crate::scene::SceneController;

/// One slot of the stack; its index in `AppState::entries` is its position.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Divider(String),
    Record(CatalogItem),
}

pub struct AppState {
    pub entries: Vec<Entry>,
    pub record_count: usize,
    pub scene: SceneController,
    pub ui: UiConfig,
    /// Where the records came from ("cache" or "discogs"), shown in the header.
    pub source: &'static str,
}

impl AppState {
    pub fn new(
        records: &[CatalogItem],
        scene: SceneConfig,
        ui: UiConfig,
        source: &'static str,
    ) -> Self {
        let stack = build_stack(records);
        let entries: Vec<Entry> = stack
            .items
            .iter()
            .map(|item| match *item {
                StackItem::Divider { genre, .. } => Entry::Divider(genre.to_string()),
                StackItem::Record { item, .. } => Entry::Record(item.clone()),
            })
            .collect();

        Self {
            record_count: records.len(),
            scene: SceneController::new(scene, stack.total),
            entries,
            ui,
            source,
        }
    }

    pub fn record(&self, position: usize) -> Option<&CatalogItem> {
        match self.entries.get(position) {
            Some(Entry::Record(item)) => Some(item),
            _ => None,
        }
    }

    pub fn selected_record(&self) -> Option<&CatalogItem> {
        self.scene.selection().and_then(|p| self.record(p))
    }

    /// Record for the info panel: hovered, else selected.
    pub fn info_record(&self) -> Option<&CatalogItem> {
        self.scene
            .hovered()
            .and_then(|p| self.record(p))
            .or_else(|| self.selected_record())
    }

    /// Position of the record closest to the scroll focus, preferring the
    /// one further down the stack on ties.
    pub fn record_near_focus(&self) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        let spacing = self.scene.config().spacing;
        let last = self.entries.len() - 1;
        let centre = if spacing > 0.0 {
            ((self.scene.focus() / spacing).round().max(0.0) as usize).min(last)
        } else {
            0
        };

        (0..=last).find_map(|d| {
            [centre.checked_add(d), centre.checked_sub(d)]
                .into_iter()
                .flatten()
                .find(|&p| p <= last && self.record(p).is_some())
        })
    }
}
