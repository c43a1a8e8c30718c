//! Property checks for the stack layout builder over randomly generated
//! collections (seeded, so failures reproduce).

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use records_proto::catalog::CatalogItem;
use records_proto::layout::{build_stack, StackItem};

const GENRES: &[&str] = &["Electronic", "Jazz", "Rock", "Unknown", "Funk / Soul", "Hip Hop"];

fn random_collection(rng: &mut StdRng) -> Vec<CatalogItem> {
    let len = rng.gen_range(0..60);
    (0..len)
        .map(|i| CatalogItem {
            id: i as u64,
            title: format!("Record {}", i),
            artist: "Artist".to_string(),
            year: rng.gen_range(0..2025),
            cover_url: String::new(),
            local_cover: format!("/records/covers/{}.jpg", i),
            is_label_image: rng.gen_bool(0.1),
            genre: GENRES.choose(rng).unwrap().to_string(),
        })
        .collect()
}

#[test]
fn test_positions_are_contiguous() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let records = random_collection(&mut rng);
        let stack = build_stack(&records);

        assert_eq!(stack.total, stack.items.len());
        for (expected, item) in stack.items.iter().enumerate() {
            assert_eq!(item.position(), expected);
        }
    }
}

#[test]
fn test_one_divider_per_genre_run_before_its_first_record() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..200 {
        let records = random_collection(&mut rng);
        let stack = build_stack(&records);

        let mut distinct: Vec<&str> = records.iter().map(|r| r.genre.as_str()).collect();
        distinct.sort();
        distinct.dedup();

        let dividers: Vec<&str> = stack
            .items
            .iter()
            .filter_map(|i| match i {
                StackItem::Divider { genre, .. } => Some(*genre),
                StackItem::Record { .. } => None,
            })
            .collect();
        // Sorted input means every genre forms exactly one run
        assert_eq!(dividers, distinct);

        let mut current: Option<&str> = None;
        for item in &stack.items {
            match item {
                StackItem::Divider { genre, .. } => current = Some(*genre),
                StackItem::Record { item, .. } => {
                    assert_eq!(current, Some(item.genre.as_str()));
                }
            }
        }
        assert_eq!(
            stack.items.iter().filter(|i| i.record().is_some()).count(),
            records.len()
        );
    }
}

#[test]
fn test_ties_keep_input_order() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..100 {
        let records = random_collection(&mut rng);
        let stack = build_stack(&records);
        for genre in GENRES {
            let in_stack: Vec<u64> = stack
                .items
                .iter()
                .filter_map(StackItem::record)
                .filter(|r| r.genre == *genre)
                .map(|r| r.id)
                .collect();
            let in_input: Vec<u64> = records
                .iter()
                .filter(|r| r.genre == *genre)
                .map(|r| r.id)
                .collect();
            assert_eq!(in_stack, in_input);
        }
    }
}

#[test]
fn test_idempotent_and_input_untouched() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..50 {
        let records = random_collection(&mut rng);
        let before = records.clone();
        let first = build_stack(&records);
        let second = build_stack(&records);
        assert_eq!(first, second);
        assert_eq!(records, before);
    }
}
