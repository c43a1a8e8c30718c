//! Stack layout builder
//!
//! Sorts the collection by genre and interleaves a divider before each genre
//! run. Positions come from a single counter, so the stack is always the
//! contiguous range `0..total`.

use serde::Serialize;

use crate::catalog::CatalogItem;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StackItem<'a> {
    Divider { genre: &'a str, position: usize },
    Record { item: &'a CatalogItem, position: usize },
}

impl<'a> StackItem<'a> {
    pub fn position(&self) -> usize {
        match self {
            StackItem::Divider { position, .. } | StackItem::Record { position, .. } => *position,
        }
    }

    pub fn genre(&self) -> &'a str {
        match *self {
            StackItem::Divider { genre, .. } => genre,
            StackItem::Record { item, .. } => item.genre.as_str(),
        }
    }

    pub fn record(&self) -> Option<&'a CatalogItem> {
        match *self {
            StackItem::Record { item, .. } => Some(item),
            StackItem::Divider { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stack<'a> {
    pub total: usize,
    pub items: Vec<StackItem<'a>>,
}

/// Build the stack for `records`: genre-sorted (stable), one divider per run.
pub fn build_stack(records: &[CatalogItem]) -> Stack<'_> {
    let mut sorted: Vec<&CatalogItem> = records.iter().collect();
    sorted.sort_by(|a, b| a.genre.cmp(&b.genre));

    let mut items = Vec::with_capacity(sorted.len() + 8);
    let mut position = 0;
    let mut last_genre: Option<&str> = None;

    for item in sorted {
        if last_genre != Some(item.genre.as_str()) {
            items.push(StackItem::Divider {
                genre: &item.genre,
                position,
            });
            position += 1;
            last_genre = Some(item.genre.as_str());
        }
        items.push(StackItem::Record { item, position });
        position += 1;
    }

    Stack {
        total: position,
        items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::mock_catalog;

    #[test]
    fn test_mock_catalog_stack() {
        let records = mock_catalog();
        let stack = build_stack(&records);

        // Electronic(2) Funk / Soul(2) Hip Hop(1) Rock(7) → 4 dividers + 12 records
        assert_eq!(stack.total, 16);
        let dividers: Vec<&str> = stack
            .items
            .iter()
            .filter(|i| i.record().is_none())
            .map(|i| i.genre())
            .collect();
        assert_eq!(dividers, ["Electronic", "Funk / Soul", "Hip Hop", "Rock"]);

        // Stable within a genre: Random Access Memories precedes Discovery
        assert_eq!(stack.items[1].record().unwrap().title, "Random Access Memories");
        assert_eq!(stack.items[2].record().unwrap().title, "Discovery");
    }

    #[test]
    fn test_empty_input() {
        let stack = build_stack(&[]);
        assert_eq!(stack.total, 0);
        assert!(stack.items.is_empty());
    }

    #[test]
    fn test_serializes_tagged() {
        let records = mock_catalog();
        let stack = build_stack(&records[..1]);
        let value = serde_json::to_value(&stack).unwrap();
        assert_eq!(value["total"], 2);
        assert_eq!(value["items"][0]["kind"], "divider");
        assert_eq!(value["items"][0]["genre"], "Electronic");
        assert_eq!(value["items"][1]["kind"], "record");
        assert_eq!(value["items"][1]["position"], 1);
        assert_eq!(value["items"][1]["item"]["title"], "Random Access Memories");
    }
}
