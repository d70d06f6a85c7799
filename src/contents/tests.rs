use super::*;

fn small() -> Contents {
    Contents::with_bucket_capacity(16)
}

#[test]
fn insert_and_stringify_round_trip() {
    let mut c = Contents::new();
    c.insert(0, b"hello world");
    assert_eq!(c.stringify(), "hello world");
    assert_eq!(c.len(), 11);
}

#[test]
fn insert_in_the_middle() {
    let mut c = Contents::new();
    c.insert(0, b"hello world");
    c.insert(5, b",");
    assert_eq!(c.stringify(), "hello, world");
}

#[test]
fn remove_slices_out_a_range() {
    let mut c = Contents::new();
    c.insert(0, b"hello world");
    c.remove(5, 6);
    assert_eq!(c.stringify(), "hello");
}

#[test]
fn insert_overflows_small_buckets_without_losing_bytes() {
    let mut c = small();
    for _ in 0..10 {
        c.append(b"0123456789");
    }
    assert_eq!(c.len(), 100);
    assert_eq!(c.stringify(), "0123456789".repeat(10));
}

#[test]
fn remove_across_bucket_boundaries() {
    let mut c = small();
    for _ in 0..4 {
        c.append(b"0123456789");
    }
    c.remove(5, 20);
    assert_eq!(c.stringify(), "0123456789" .to_string() + "0123456789");
    assert_eq!(c.len(), 20);
}

#[test]
fn iterator_advance_and_retreat_are_inverse() {
    let mut c = small();
    c.append(b"0123456789abcdef0123456789");
    let mut it = c.iterator_at(3);
    it.advance(10, &c);
    assert_eq!(it.position, 13);
    it.retreat(10, &c);
    assert_eq!(it.position, 3);
    assert_eq!(it.get(&c), b'3');
}

#[test]
fn advance_one_crosses_bucket_boundary() {
    let mut c = small();
    c.append(b"0123456789abcdef0123456789");
    let mut it = c.start();
    for _ in 0..c.len() {
        it.advance_one(&c);
    }
    assert!(it.at_eob(&c));
}

#[test]
fn advance_most_clamps_to_end() {
    let mut c = small();
    c.append(b"short");
    let mut it = c.start();
    it.advance_most(1000, &c);
    assert!(it.at_eob(&c));
}

#[test]
fn retreat_most_clamps_to_start() {
    let mut c = small();
    c.append(b"short");
    let mut it = c.end();
    it.retreat_most(1000, &c);
    assert!(it.at_bob());
}

#[test]
fn line_numbers_are_one_indexed_and_track_newlines() {
    let mut c = Contents::new();
    c.insert(0, b"one\ntwo\nthree");
    assert_eq!(c.get_line_number(0), 1);
    assert_eq!(c.get_line_number(4), 2);
    assert_eq!(c.get_line_number(8), 3);
}

#[test]
fn slice_reads_a_byte_range() {
    let mut c = Contents::new();
    c.insert(0, b"hello world");
    let start = c.iterator_at(6);
    assert_eq!(c.slice(start, 11).as_str(), "world");
}
