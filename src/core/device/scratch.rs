// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Scratch string pool
//!
//! A fixed ring of reusable string buffers for transient query results.
//! `acquire()` hands out the next buffer in round-robin order, cleared. A
//! buffer's contents survive until [`SCRATCH_POOL_ENTRIES`] further
//! acquisitions.
//!
//! # Example
//!
//! ```
//! use devcore::core::device::scratch::ScratchPool;
//! use std::fmt::Write;
//!
//! let mut pool = ScratchPool::new();
//! let buffer = pool.acquire();
//! write!(buffer, "maincpu:{}", 2).unwrap();
//! assert_eq!(buffer.as_str(), "maincpu:2");
//! ```

use std::fmt;

/// Number of buffers in the ring
pub const SCRATCH_POOL_ENTRIES: usize = 16;

/// Capacity of each buffer in bytes
pub const MAX_STRING_LENGTH: usize = 256;

/// One buffer of the scratch pool
#[derive(Debug)]
pub struct ScratchBuffer {
    index: usize,
    text: String,
}

impl ScratchBuffer {
    fn new(index: usize) -> Self {
        Self {
            index,
            text: String::with_capacity(MAX_STRING_LENGTH),
        }
    }

    /// Slot of this buffer within the ring
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Append text, truncating at the buffer capacity
    pub fn push_str(&mut self, s: &str) {
        let room = MAX_STRING_LENGTH - self.text.len();
        self.text.push_str(&s[..floor_char_boundary(s, room)]);
    }

    /// Move the backing string out, leaving the buffer empty
    pub(crate) fn take_string(&mut self) -> String {
        let mut text = std::mem::take(&mut self.text);
        text.clear();
        text
    }

    /// Put a backing string back, truncating at the buffer capacity
    pub(crate) fn restore_string(&mut self, mut text: String) {
        text.truncate(floor_char_boundary(&text, MAX_STRING_LENGTH));
        self.text = text;
    }
}

impl fmt::Write for ScratchBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }
}

/// Largest index `<= max` that falls on a char boundary of `s`
fn floor_char_boundary(s: &str, max: usize) -> usize {
    if max >= s.len() {
        return s.len();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    end
}

/// Rotating set of scratch string buffers
#[derive(Debug)]
pub struct ScratchPool {
    buffers: Vec<ScratchBuffer>,
    /// Total acquisitions so far; the next slot is `cursor % SCRATCH_POOL_ENTRIES`
    cursor: usize,
}

impl ScratchPool {
    pub fn new() -> Self {
        Self {
            buffers: (0..SCRATCH_POOL_ENTRIES).map(ScratchBuffer::new).collect(),
            cursor: 0,
        }
    }

    /// Hand out the next buffer in round-robin order, cleared
    pub fn acquire(&mut self) -> &mut ScratchBuffer {
        let slot = self.cursor % SCRATCH_POOL_ENTRIES;
        self.cursor = self.cursor.wrapping_add(1);

        let buffer = &mut self.buffers[slot];
        buffer.clear();
        buffer
    }

    /// Look at a buffer without acquiring it
    pub fn get(&self, index: usize) -> Option<&ScratchBuffer> {
        self.buffers.get(index)
    }

    /// Number of acquisitions performed so far
    pub fn acquisitions(&self) -> usize {
        self.cursor
    }
}

impl Default for ScratchPool {
    fn default() -> Self {
        Self::new()
    }
}
