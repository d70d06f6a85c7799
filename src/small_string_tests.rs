use super::*;

#[test]
fn short_strings_stay_inline() {
    let s = SmallString::from_str("hello");
    assert!(s.is_inline());
    assert_eq!(s.as_str(), "hello");
}

#[test]
fn exact_boundary_stays_inline() {
    let s = SmallString::from_str(&"a".repeat(INLINE_CAP));
    assert!(s.is_inline());
    assert_eq!(s.len(), INLINE_CAP);
}

#[test]
fn over_boundary_spills_to_heap() {
    let s = SmallString::from_str(&"a".repeat(INLINE_CAP + 1));
    assert!(!s.is_inline());
    assert_eq!(s.len(), INLINE_CAP + 1);
}

#[test]
fn push_str_promotes_when_it_overflows_inline_cap() {
    let mut s = SmallString::from_str("0123456789");
    assert!(s.is_inline());
    s.push_str("abcdefghij");
    assert!(!s.is_inline());
    assert_eq!(s.as_str(), "0123456789abcdefghij");
}

#[test]
fn push_str_stays_inline_when_it_fits() {
    let mut s = SmallString::from_str("abc");
    s.push_str("def");
    assert!(s.is_inline());
    assert_eq!(s.as_str(), "abcdef");
}

#[test]
fn equality_is_value_based_regardless_of_representation() {
    let inline = SmallString::from_str("short");
    let heap = SmallString::from_str(&"x".repeat(64));
    assert_ne!(inline, heap);
    assert_eq!(inline, SmallString::from_str("short"));
}

#[test]
fn from_char_round_trips_unicode() {
    let s = SmallString::from_char('λ');
    assert_eq!(s.as_str(), "λ");
}
