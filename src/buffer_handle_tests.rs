use super::*;
use crate::buffer::BufferId;
use crate::edit::Edit;
use std::thread;

fn handle() -> Arc<BufferHandle> {
    BufferHandle::new(Buffer::new(BufferId(1), "scratch"))
}

#[test]
fn write_then_read_sees_committed_edits() {
    let h = handle();
    {
        let mut w = h.lock_writing();
        w.commit(vec![Edit::insert(0, "hi")], None).unwrap();
    }
    let r = h.lock_reading();
    assert_eq!(r.contents().stringify(), "hi");
}

#[test]
fn multiple_readers_can_overlap() {
    let h = handle();
    let r1 = h.lock_reading();
    let r2 = h.try_lock_reading();
    assert!(r2.is_some());
    drop(r1);
    drop(r2);
}

#[test]
fn try_lock_reading_fails_while_writer_holds_it() {
    let h = handle();
    let _w = h.lock_writing();
    assert!(h.try_lock_reading().is_none());
}

#[test]
fn downgrade_allows_concurrent_readers_after() {
    let h = handle();
    let w = h.lock_writing();
    let r = w.downgrade();
    let r2 = h.try_lock_reading();
    assert!(r2.is_some());
    drop(r);
    drop(r2);
}

#[test]
fn upgrade_from_sole_reader_grants_write_access() {
    let h = handle();
    let r = h.lock_reading();
    let mut w = r.upgrade();
    w.commit(vec![Edit::insert(0, "x")], None).unwrap();
    assert_eq!(w.contents().stringify(), "x");
}

#[test]
#[should_panic(expected = "already holds this buffer's lock")]
fn write_locking_the_same_buffer_twice_on_one_thread_panics() {
    let h = handle();
    let _w1 = h.lock_writing();
    let _w2 = h.lock_writing();
}

#[test]
#[should_panic(expected = "already holds a write lock on another buffer")]
fn write_locking_a_second_buffer_while_holding_one_panics() {
    let a = handle();
    let b = handle();
    let _wa = a.lock_writing();
    let _wb = b.lock_writing();
}

#[test]
fn writer_blocks_until_reader_drops() {
    let h = handle();
    let r = h.lock_reading();
    let h2 = h.clone();
    let started = std::time::Instant::now();
    let writer = thread::spawn(move || {
        let _w = h2.lock_writing();
    });
    thread::sleep(std::time::Duration::from_millis(30));
    assert!(!writer.is_finished());
    drop(r);
    writer.join().unwrap();
    assert!(started.elapsed() >= std::time::Duration::from_millis(30));
}
