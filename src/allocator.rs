//! Bump allocation of data blocks.
//!
//! The cursor is never stored on disk. It is recomputed from the table as the end of
//! the furthest occupied region, so blocks freed by a delete are never handed out
//! again, not within a session and not after a reopen. Repeated write/delete cycles
//! therefore walk monotonically through the address space.

use crate::config::*;
use crate::DirEntry;

/// Blocks needed to hold `size` bytes, rounded up.
pub fn blocks_for(size: usize) -> u32 {
    size.div_ceil(BLOCK_SIZE) as u32
}

/// Next free block: max(start_lba + blocks) over occupied entries, or the first
/// data block for an empty table.
/// Saturates at u32::MAX for corrupt entries instead of wrapping.
pub fn next_free_lba<'a>(entries: impl IntoIterator<Item = &'a DirEntry>) -> u32 {
    entries
        .into_iter()
        .filter(|entry| !entry.is_free())
        .map(|entry| entry.start_lba.saturating_add(entry.blocks()))
        .fold(FIRST_DATA_BLOCK, u32::max)
}
