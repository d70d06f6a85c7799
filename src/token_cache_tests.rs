use super::*;
use crate::edit::{Commit, CommitId};

struct WordTokenizer;

impl Tokenizer for WordTokenizer {
    fn next_token(&self, contents: &Contents, iterator: &mut Contents_Iterator, state: &mut u64) -> Option<Token> {
        if iterator.at_eob(contents) {
            return None;
        }
        let start = iterator.position;
        iterator.advance_one(contents);
        *state += 1;
        Some(Token { start, end: iterator.position })
    }
}

fn buf(text: &str) -> Contents {
    let mut c = Contents::new();
    c.insert(0, text.as_bytes());
    c
}

#[test]
fn fresh_cache_is_not_covered() {
    let cache = TokenCache::new(1024);
    assert!(!cache.is_covered(0));
}

#[test]
fn ran_to_end_covers_everything() {
    let contents = buf("hello");
    let mut cache = TokenCache::new(1024);
    cache.generate_check_points_until(&contents, &WordTokenizer, contents.len());
    assert!(cache.is_covered(contents.len()));
}

#[test]
fn checkpoints_advance_by_token_step() {
    let contents = buf(&"a".repeat(3000));
    let mut cache = TokenCache::new(1024);
    cache.generate_check_points_until(&contents, &WordTokenizer, 2500);
    assert!(cache.check_points().len() >= 2);
    for w in cache.check_points().windows(2) {
        assert!(w[1].position - w[0].position >= 1024);
    }
}

#[test]
fn find_check_point_returns_last_at_or_before() {
    let mut cache = TokenCache::new(1024);
    cache.check_points = vec![
        CheckPoint { position: 0, state: 0 },
        CheckPoint { position: 1024, state: 1 },
        CheckPoint { position: 2048, state: 2 },
    ];
    assert_eq!(cache.find_check_point(1500), Some(1));
    assert_eq!(cache.find_check_point(2048), Some(2));
}

#[test]
fn update_with_no_pending_changes_is_a_no_op() {
    let contents = buf("hello world");
    let mut cache = TokenCache::new(1024);
    cache.generate_check_points_until(&contents, &WordTokenizer, contents.len());
    let before = cache.check_points().to_vec();
    assert!(cache.update(&contents, &[], &WordTokenizer));
    assert_eq!(cache.check_points(), before.as_slice());
}

#[test]
fn update_shifts_checkpoints_after_an_insert_before_them() {
    let mut contents = buf(&"a".repeat(3000));
    let mut cache = TokenCache::new(1024);
    cache.generate_check_points_until(&contents, &WordTokenizer, contents.len());
    let original_positions: Vec<u64> = cache.check_points().iter().map(|cp| cp.position).collect();

    contents.insert(0, b"xx");
    let change = Change {
        commit: Commit {
            edits: vec![Edit::insert(0, "xx")],
            id: CommitId(1),
        },
        is_redo: true,
    };
    cache.update(&contents, &[change], &WordTokenizer);

    for (old, cp) in original_positions.iter().zip(cache.check_points()) {
        assert_eq!(cp.position, old + 2);
    }
}
