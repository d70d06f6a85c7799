use super::syntax_highlight::SyntaxHighlightJob;
use super::*;
use crate::buffer::mode::Mode;
use crate::buffer::{Buffer, BufferId};
use crate::buffer_handle::BufferHandle;
use crate::contents::{Contents, Contents_Iterator};
use crate::edit::Edit;
use crate::token_cache::{Token, TokenCache, Tokenizer};
use std::sync::Arc;

struct ByteTokenizer;

impl Tokenizer for ByteTokenizer {
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

fn handle_with_text(text: &str, token_step: u64) -> Arc<BufferHandle> {
    let mut buffer = Buffer::new(BufferId(1), "scratch");
    buffer.mode = Mode::new("test", 8, Arc::new(ByteTokenizer));
    buffer.token_cache = TokenCache::new(token_step);
    buffer.commit(vec![Edit::insert(0, text)], None).unwrap();
    BufferHandle::new(buffer)
}

#[test]
fn syntax_highlight_job_runs_to_completion() {
    let handle = handle_with_text(&"a".repeat(40), 4);
    let mut job = SyntaxHighlightJob::new(Arc::downgrade(&handle));

    let mut ticks = 0;
    loop {
        match job.tick() {
            JobTick::Finished => break,
            JobTick::MadeProgress => {}
            JobTick::Stalled => panic!("no contention, should not stall"),
        }
        ticks += 1;
        assert!(ticks < 1000, "job did not converge");
    }

    let reader = handle.lock_reading();
    assert!(reader.token_cache.is_covered(reader.contents().len()));
}

#[test]
fn syntax_highlight_job_finishes_once_buffer_is_dropped() {
    let handle = handle_with_text("abc", 4);
    let weak = Arc::downgrade(&handle);
    drop(handle);

    let mut job = SyntaxHighlightJob::new(weak);
    assert_eq!(job.tick(), JobTick::Finished);
}

#[test]
fn syntax_highlight_job_stalls_while_a_writer_holds_the_buffer() {
    let handle = handle_with_text(&"a".repeat(40), 4);
    let mut job = SyntaxHighlightJob::new(Arc::downgrade(&handle));
    let _writer = handle.lock_writing();
    assert_eq!(job.tick(), JobTick::Stalled);
}

struct CountdownJob {
    remaining: u32,
}

impl Job for CountdownJob {
    fn tick(&mut self) -> JobTick {
        if self.remaining == 0 {
            JobTick::Finished
        } else {
            self.remaining -= 1;
            JobTick::MadeProgress
        }
    }
}

#[test]
fn run_synchronous_pass_removes_jobs_that_finish() {
    let mut scheduler = JobScheduler::new(4, 1);
    scheduler.push_synchronous(Box::new(CountdownJob { remaining: 0 }));
    scheduler.push_synchronous(Box::new(CountdownJob { remaining: 3 }));
    scheduler.run_synchronous_pass();
    assert_eq!(scheduler.synchronous.len(), 1);
}

struct AlwaysStall;

impl Job for AlwaysStall {
    fn tick(&mut self) -> JobTick {
        JobTick::Stalled
    }
}

#[test]
fn shutdown_joins_asynchronous_jobs_promptly() {
    let mut scheduler = JobScheduler::new(4, 1);
    scheduler.spawn_asynchronous(Box::new(AlwaysStall));
    std::thread::sleep(std::time::Duration::from_millis(5));
    scheduler.shutdown();
    assert!(scheduler.async_handles.is_empty());
}
