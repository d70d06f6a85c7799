//! Bucketed byte store backing a buffer's text.
//!
//! Content is kept as an ordered list of fixed-capacity `Bucket`s rather than
//! one contiguous allocation, so a large insert or remove only touches the
//! buckets it overlaps instead of shifting the whole buffer. A
//! `ContentsIterator` walks the structure by absolute byte position with
//! O(1) amortized `advance`/`retreat` and an O(buckets) `seek` for random
//! jumps.

use crate::small_string::SmallString;

/// Default bucket capacity in bytes; new buckets are filled to
/// `DESIRED_LEN` and allowed to grow up to `capacity` before splitting.
pub const DEFAULT_BUCKET_CAPACITY: usize = 4096;

#[derive(Debug, Clone)]
struct Bucket {
    data: Vec<u8>,
    newlines: usize,
}

impl Bucket {
    fn empty(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            newlines: 0,
        }
    }

    fn recount_newlines(&mut self) {
        self.newlines = bytecount_newlines(&self.data);
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

fn bytecount_newlines(data: &[u8]) -> usize {
    data.iter().filter(|&&b| b == b'\n').count()
}

/// The bucketed text store for a single buffer.
#[derive(Debug, Clone)]
pub struct Contents {
    buckets: Vec<Bucket>,
    capacity: usize,
    len: u64,
}

impl Contents {
    pub fn new() -> Self {
        Self::with_bucket_capacity(DEFAULT_BUCKET_CAPACITY)
    }

    pub fn with_bucket_capacity(capacity: usize) -> Self {
        Self {
            buckets: Vec::new(),
            capacity,
            len: 0,
        }
    }

    pub fn from_str(s: &str, capacity: usize) -> Self {
        let mut contents = Self::with_bucket_capacity(capacity);
        contents.insert(0, s.as_bytes());
        contents
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn desired_len(&self) -> usize {
        self.capacity * 3 / 4
    }

    /// Inserts `bytes` at absolute `position`, splitting buckets as needed.
    pub fn insert(&mut self, position: u64, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        debug_assert!(position <= self.len);

        let mut remaining = position;
        for b in 0..self.buckets.len() {
            let blen = self.buckets[b].len() as u64;
            if remaining <= blen {
                self.insert_into_bucket(b, remaining as usize, bytes);
                self.len += bytes.len() as u64;
                return;
            }
            remaining -= blen;
        }
        // Falls past the end of every bucket: append new bucket(s).
        self.append_new_buckets(bytes);
        self.len += bytes.len() as u64;
    }

    fn insert_into_bucket(&mut self, b: usize, index: usize, bytes: &[u8]) {
        let capacity = self.capacity;
        let desired = self.desired_len();
        let bucket = &mut self.buckets[b];
        if bucket.len() + bytes.len() <= capacity {
            bucket.data.splice(index..index, bytes.iter().copied());
            bucket.recount_newlines();
            return;
        }
        // Overflow: split the bucket's tail off, then lay both the
        // inserted bytes and the tail out across fresh buckets sized to
        // `desired`.
        let tail: Vec<u8> = bucket.data.split_off(index);
        bucket.recount_newlines();

        let mut combined = Vec::with_capacity(bytes.len() + tail.len());
        combined.extend_from_slice(bytes);
        combined.extend_from_slice(&tail);

        let mut insert_at = b + 1;
        for chunk in combined.chunks(desired.max(1)) {
            let mut nb = Bucket::empty(capacity);
            nb.data.extend_from_slice(chunk);
            nb.recount_newlines();
            self.buckets.insert(insert_at, nb);
            insert_at += 1;
        }
    }

    fn append_new_buckets(&mut self, bytes: &[u8]) {
        let desired = self.desired_len().max(1);
        for chunk in bytes.chunks(desired) {
            let mut nb = Bucket::empty(self.capacity);
            nb.data.extend_from_slice(chunk);
            nb.recount_newlines();
            self.buckets.push(nb);
        }
    }

    /// Removes `len` bytes starting at absolute `start`.
    pub fn remove(&mut self, start: u64, len: u64) {
        if len == 0 {
            return;
        }
        debug_assert!(start + len <= self.len);

        let mut remaining_start = start;
        let mut remaining_len = len;
        let mut b = 0;
        while b < self.buckets.len() && remaining_len > 0 {
            let blen = self.buckets[b].len() as u64;
            if remaining_start < blen {
                let end = (remaining_start + remaining_len).min(blen);
                let removed = end - remaining_start;
                let bucket = &mut self.buckets[b];
                bucket
                    .data
                    .drain(remaining_start as usize..end as usize);
                bucket.recount_newlines();
                remaining_len -= removed;
                remaining_start = 0;
            } else {
                remaining_start -= blen;
            }
            b += 1;
        }
        self.buckets.retain(|bucket| bucket.len() > 0);
        self.len -= len;
    }

    pub fn append(&mut self, bytes: &[u8]) {
        self.insert(self.len, bytes);
    }

    /// Renders the full contents as an owned `String`. Panics if the bytes
    /// are not valid UTF-8, which the buffer layer guarantees.
    pub fn stringify(&self) -> String {
        let mut out = String::with_capacity(self.len as usize);
        for bucket in &self.buckets {
            out.push_str(std::str::from_utf8(&bucket.data).expect("contents must be valid utf8"));
        }
        out
    }

    pub fn slice_into(&self, start: Contents_Iterator, end: u64) -> Vec<u8> {
        debug_assert!(start.position <= end && end <= self.len);
        let mut out = Vec::with_capacity((end - start.position) as usize);
        let mut it = start;
        while it.position < end {
            let bucket = &self.buckets[it.bucket];
            let take = (bucket.len() - it.index).min((end - it.position) as usize);
            out.extend_from_slice(&bucket.data[it.index..it.index + take]);
            it.advance(take as u64, self);
        }
        out
    }

    pub fn slice(&self, start: Contents_Iterator, end: u64) -> SmallString {
        let bytes = self.slice_into(start, end);
        SmallString::from_str(std::str::from_utf8(&bytes).expect("slice must be valid utf8"))
    }

    pub fn get_once(&self, position: u64) -> u8 {
        let mut remaining = position;
        for bucket in &self.buckets {
            let blen = bucket.len() as u64;
            if remaining < blen {
                return bucket.data[remaining as usize];
            }
            remaining -= blen;
        }
        panic!("Contents::get_once out of bounds");
    }

    /// Locates the (bucket, index) pair for an absolute position by
    /// walking the bucket list; O(buckets), used for random seeks. Once
    /// positioned, `Contents_Iterator::advance`/`retreat` move in O(1)
    /// amortized by stepping within or across adjacent buckets.
    pub fn iterator_at(&self, position: u64) -> Contents_Iterator {
        if position == self.len {
            return self.end();
        }
        let mut remaining = position;
        for (b, bucket) in self.buckets.iter().enumerate() {
            let blen = bucket.len() as u64;
            if remaining < blen {
                return Contents_Iterator {
                    position,
                    bucket: b,
                    index: remaining as usize,
                };
            }
            remaining -= blen;
        }
        self.end()
    }

    pub fn start(&self) -> Contents_Iterator {
        Contents_Iterator {
            position: 0,
            bucket: 0,
            index: 0,
        }
    }

    pub fn end(&self) -> Contents_Iterator {
        Contents_Iterator {
            position: self.len,
            bucket: self.buckets.len(),
            index: 0,
        }
    }

    /// Returns the 1-indexed line number containing `position`.
    pub fn get_line_number(&self, position: u64) -> u64 {
        let mut remaining = position;
        let mut line = 1u64;
        for bucket in &self.buckets {
            let blen = bucket.len() as u64;
            if remaining <= blen {
                line += bytecount_newlines(&bucket.data[..remaining as usize]) as u64;
                return line;
            }
            line += bucket.newlines as u64;
            remaining -= blen;
        }
        line
    }
}

impl Default for Contents {
    fn default() -> Self {
        Self::new()
    }
}

/// A cursor over a `Contents`' bytes, addressed by absolute position.
///
/// Does not borrow its `Contents` (unlike the original's pointer-carrying
/// iterator) so callers can hold several cursors and a `&mut Contents`
/// without fighting the borrow checker; every method that reads bytes takes
/// the `Contents` explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub struct Contents_Iterator {
    pub position: u64,
    bucket: usize,
    index: usize,
}

impl Contents_Iterator {
    pub fn at_bob(&self) -> bool {
        self.position == 0
    }

    pub fn at_eob(&self, contents: &Contents) -> bool {
        self.position == contents.len
    }

    pub fn get(&self, contents: &Contents) -> u8 {
        contents.buckets[self.bucket].data[self.index]
    }

    /// Steps forward one byte. O(1): only crosses into the next bucket
    /// when `index` runs off the end of the current one.
    pub fn advance_one(&mut self, contents: &Contents) {
        debug_assert!(!self.at_eob(contents));
        self.position += 1;
        self.index += 1;
        if self.index == contents.buckets[self.bucket].len() {
            self.bucket += 1;
            self.index = 0;
        }
    }

    /// Steps backward one byte. O(1) for the same reason as `advance_one`.
    pub fn retreat_one(&mut self, contents: &Contents) {
        debug_assert!(!self.at_bob());
        self.position -= 1;
        if self.index == 0 {
            self.bucket -= 1;
            self.index = contents.buckets[self.bucket].len();
        }
        self.index -= 1;
    }

    /// Steps forward `offset` bytes, amortized O(1) per byte: within a
    /// bucket this is a single index bump, and it only crosses a bucket
    /// boundary once per bucket traversed rather than once per byte.
    pub fn advance(&mut self, offset: u64, contents: &Contents) {
        let mut remaining = offset;
        while remaining > 0 {
            if self.bucket >= contents.buckets.len() {
                debug_assert_eq!(remaining, 0);
                break;
            }
            let blen = contents.buckets[self.bucket].len() as u64;
            let room = blen - self.index as u64;
            if remaining < room {
                self.index += remaining as usize;
                self.position += remaining;
                remaining = 0;
            } else {
                self.position += room;
                remaining -= room;
                self.bucket += 1;
                self.index = 0;
            }
        }
    }

    pub fn retreat(&mut self, offset: u64, contents: &Contents) {
        let mut remaining = offset;
        while remaining > 0 {
            if self.index as u64 >= remaining {
                self.index -= remaining as usize;
                self.position -= remaining;
                remaining = 0;
            } else {
                remaining -= self.index as u64;
                self.position -= self.index as u64;
                self.bucket -= 1;
                self.index = contents.buckets[self.bucket].len();
            }
        }
    }

    pub fn go_to(&mut self, new_position: u64, contents: &Contents) {
        if new_position < self.position {
            self.retreat(self.position - new_position, contents);
        } else {
            self.advance(new_position - self.position, contents);
        }
    }

    pub fn advance_to(&mut self, new_position: u64, contents: &Contents) {
        self.advance(new_position - self.position, contents);
    }

    pub fn retreat_to(&mut self, new_position: u64, contents: &Contents) {
        self.retreat(self.position - new_position, contents);
    }

    pub fn advance_most(&mut self, offset: u64, contents: &Contents) {
        let target = (self.position + offset).min(contents.len);
        *self = contents.iterator_at(target);
    }

    pub fn retreat_most(&mut self, offset: u64, contents: &Contents) {
        let target = self.position.saturating_sub(offset);
        *self = contents.iterator_at(target);
    }

    pub fn get_line_number(&self, contents: &Contents) -> u64 {
        contents.get_line_number(self.position)
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
