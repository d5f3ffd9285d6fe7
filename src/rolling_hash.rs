//! Polynomial hash over the characters of a word group.
//!
//! Each character folds in as `h = (BASE * h + code) mod PRIME`, where `code` is the
//! Unicode scalar value. With a modulus this small collisions are routine, so equal
//! digests are only a pre-filter: callers must compare the words.

use crate::tokenizer::WordSequence;

pub const PRIME: u32 = 101;
pub const BASE: u32 = 256;

#[derive(Debug, Clone, Copy, Default)]
pub struct RollingHash {
    value: u32,
}

impl RollingHash {
    pub fn new() -> Self {
        Self { value: 0 }
    }

    pub fn push_char(&mut self, ch: char) {
        // u64 keeps BASE * (PRIME - 1) + 0x10FFFF well clear of overflow.
        let folded = BASE as u64 * self.value as u64 + ch as u64;
        self.value = (folded % PRIME as u64) as u32;
    }

    pub fn push_str(&mut self, s: &str) {
        for ch in s.chars() {
            self.push_char(ch);
        }
    }

    pub fn digest(&self) -> u32 {
        self.value
    }
}

/// Hash of the group string for `words[start..start + size]`.
///
/// Folds words and single-space separators directly instead of allocating the joined
/// string. Panics if the window is empty or runs past the end of `words`.
pub fn window_hash(words: &WordSequence, start: usize, size: usize) -> u32 {
    assert!(size > 0, "window size must be at least one word");
    let mut hash = RollingHash::new();
    for (k, word) in words.window(start, size).iter().enumerate() {
        if k > 0 {
            hash.push_char(' ');
        }
        hash.push_str(word);
    }
    hash.digest()
}
