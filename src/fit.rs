//! The file index table (FIT): a fixed array of directory entries stored in the
//! first block of the filesystem.
//!
//! Layout of the block:
//! - MAX_FILES records of DIR_ENTRY_SIZE bytes, record `i` at byte `i * DIR_ENTRY_SIZE`
//! - zero padding up to BLOCK_SIZE
//!
//! Slot order is storage order. Nothing is ever sorted.

use std::borrow::Cow;

use log::{debug, warn};

use crate::config::*;
use crate::{BlockDevice, DirEntry, Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIndexTable {
    entries: [DirEntry; MAX_FILES],
}

impl Default for FileIndexTable {
    fn default() -> Self {
        Self::new()
    }
}

impl FileIndexTable {
    /// A table with every slot free.
    pub fn new() -> Self {
        Self {
            entries: std::array::from_fn(|_| DirEntry::FREE),
        }
    }

    /// Builds a table from up to MAX_FILES entries, remaining slots are free.
    pub fn from_entries(entries: &[DirEntry]) -> Result<Self> {
        if entries.len() > MAX_FILES {
            return Err(Error::InvalidArgument(format!(
                "{} entries do not fit in a table of {}",
                entries.len(),
                MAX_FILES
            )));
        }
        let mut table = Self::new();
        table.entries[..entries.len()].clone_from_slice(entries);
        Ok(table)
    }

    /// All slots, free ones included.
    pub fn entries(&self) -> &[DirEntry] {
        &self.entries
    }

    /// Occupied slots in storage order.
    pub fn occupied(&self) -> impl Iterator<Item = &DirEntry> {
        self.entries.iter().filter(|entry| !entry.is_free())
    }

    pub fn get(&self, slot: usize) -> Option<&DirEntry> {
        self.entries.get(slot)
    }

    /// Slot holding exactly `name`, compared byte for byte.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.name_eq(name))
    }

    /// Lowest-numbered free slot. Unrelated to where data lives on disk.
    pub fn first_free(&self) -> Option<usize> {
        self.entries.iter().position(DirEntry::is_free)
    }

    pub fn set(&mut self, slot: usize, entry: DirEntry) {
        self.entries[slot] = entry;
    }

    pub fn clear(&mut self, slot: usize) {
        self.entries[slot] = DirEntry::FREE;
    }

    pub fn clear_all(&mut self) {
        self.entries.iter_mut().for_each(|entry| *entry = DirEntry::FREE);
    }
}

fn le_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Longest prefix of `name` that fits in the name buffer next to its terminator,
/// cut on a char boundary.
fn truncated_name(name: &str) -> &[u8] {
    let mut end = name.len().min(MAX_FILE_NAME_LEN - 1);
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name.as_bytes()[..end]
}

/// Decodes a table from the raw bytes of its block.
/// Names are cut at the first NUL, decoded lossily and capped at MAX_FILE_NAME_LEN - 1
/// bytes, so a damaged name never fails the whole load.
/// Fails only if `buf` is too short to hold every record.
pub fn decode(buf: &[u8]) -> Result<FileIndexTable> {
    if buf.len() < FIT_SIZE {
        return Err(Error::Format(format!(
            "file index table truncated: {} of {} bytes",
            buf.len(),
            FIT_SIZE
        )));
    }

    let mut table = FileIndexTable::new();
    for (slot, record) in buf[..FIT_SIZE].chunks_exact(DIR_ENTRY_SIZE).enumerate() {
        let raw_name = &record[..MAX_FILE_NAME_LEN];
        let name_len = raw_name.iter().position(|&c| c == 0).unwrap_or(MAX_FILE_NAME_LEN);
        let mut name = match String::from_utf8_lossy(&raw_name[..name_len]) {
            Cow::Borrowed(name) => name.to_string(),
            Cow::Owned(name) => {
                warn!("slot {}: name is not valid UTF-8, decoded as '{}'", slot, name);
                name
            }
        };
        // Unterminated or widened by replacement chars: keep what encode can store back.
        if name.len() >= MAX_FILE_NAME_LEN {
            let keep = truncated_name(&name).len();
            warn!("slot {}: name '{}' too long, shortened to {} bytes", slot, name, keep);
            name.truncate(keep);
        }
        table.entries[slot] = DirEntry {
            name,
            start_lba: le_u32(&record[MAX_FILE_NAME_LEN..]),
            size_bytes: le_u32(&record[MAX_FILE_NAME_LEN + 4..]),
        };
    }
    Ok(table)
}

/// Encodes a table into exactly one zero-padded block.
pub fn encode(table: &FileIndexTable) -> Box<[u8; BLOCK_SIZE]> {
    let mut buf = Box::new([0u8; BLOCK_SIZE]);
    for (slot, entry) in table.entries.iter().enumerate() {
        let record = &mut buf[slot * DIR_ENTRY_SIZE..(slot + 1) * DIR_ENTRY_SIZE];
        let name = truncated_name(&entry.name);
        record[..name.len()].copy_from_slice(name);
        record[MAX_FILE_NAME_LEN..MAX_FILE_NAME_LEN + 4].copy_from_slice(&entry.start_lba.to_le_bytes());
        record[MAX_FILE_NAME_LEN + 4..].copy_from_slice(&entry.size_bytes.to_le_bytes());
    }
    buf
}

pub fn read_fit<D: BlockDevice + ?Sized>(device: &D) -> Result<FileIndexTable> {
    let mut buf = Box::new([0u8; BLOCK_SIZE]);
    let available = device.read_blocks(FIT_BLOCK_ID, buf.as_mut_slice())?;
    decode(&buf[..available])
}

/// Rewrites the whole table block. There is no partial update.
pub fn write_fit<D: BlockDevice + ?Sized>(device: &D, table: &FileIndexTable) -> Result<()> {
    let buf = encode(table);
    device.write_blocks(FIT_BLOCK_ID, buf.as_slice())?;
    device.flush()?;
    debug!("flushed file index table ({} entries in use)", table.occupied().count());
    Ok(())
}
