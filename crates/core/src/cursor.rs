//! Cursor arithmetic for sequential draws.
//!
//! A stored cursor is the index of the next item to serve. Values read back
//! from storage are untrusted: anything at or past the end of the catalog
//! starts a new cycle, anything negative is treated as a reset.

use std::num::NonZeroUsize;

/// Outcome of planning one draw against a stored cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawPlan {
    /// Catalog index to serve.
    pub index: usize,
    /// Cursor value to persist after serving `index`.
    pub next_cursor: u64,
    /// The previous cycle was exhausted and this draw starts a new one.
    pub rolled_over: bool,
    /// The stored value was negative and has been discarded.
    pub was_corrupted: bool,
}

/// Plan the next draw for a catalog of `len` items.
///
/// The returned `index` is always below `len`.
#[must_use]
pub fn plan_draw(stored: i64, len: NonZeroUsize) -> DrawPlan {
    let len = len.get();
    let (index, rolled_over, was_corrupted) = match usize::try_from(stored) {
        Err(_) => (0, false, true),
        Ok(cursor) if cursor >= len => (0, true, false),
        Ok(cursor) => (cursor, false, false),
    };

    DrawPlan {
        index,
        next_cursor: u64::try_from(index + 1).unwrap_or(u64::MAX),
        rolled_over,
        was_corrupted,
    }
}

/// Items left before the current cycle rolls over.
#[must_use]
pub fn remaining(stored: i64, len: usize) -> usize {
    match usize::try_from(stored) {
        Ok(cursor) if cursor < len => len - cursor,
        Ok(_) => 0,
        Err(_) => len,
    }
}
