use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::allocator::{blocks_for, next_free_lba};
use crate::config::*;
use crate::fit::{read_fit, write_fit, FileIndexTable};
use crate::image::{ImageFile, Layout};
use crate::path;
use crate::structs::validate_name;
use crate::{BlockDevice, DirEntry, Entry, Error, Result};

/// The filesystem engine.
///
/// Holds the whole file index table in memory and rewrites its block after every
/// mutation. Assumes it is the only user of the device: there is no locking and the
/// last writer of the table block wins.
#[derive(Debug)]
pub struct FileSystem<D: BlockDevice> {
    device: Arc<D>,
    table: FileIndexTable,
    next_free_lba: u32,
}

impl FileSystem<ImageFile> {
    /// Opens the image at `path`, creating and formatting it if it does not exist.
    pub fn open(image_path: impl AsRef<Path>, layout: Layout) -> Result<Self> {
        let image_path = image_path.as_ref();
        let created = ImageFile::ensure_exists(image_path)?;
        let device = Arc::new(ImageFile::open(image_path, layout)?);
        info!(
            "opening {} at base block {}",
            image_path.display(),
            layout.base_block()
        );
        if created {
            Self::create(device)
        } else {
            Self::mount(device)
        }
    }
}

impl<D: BlockDevice> FileSystem<D> {
    /// Puts a fresh, empty table on `device`.
    pub fn create(device: Arc<D>) -> Result<Self> {
        let mut fs_inst = Self {
            device,
            table: FileIndexTable::new(),
            next_free_lba: FIRST_DATA_BLOCK,
        };
        fs_inst.format()?;
        Ok(fs_inst)
    }

    /// Loads the table already on `device`.
    pub fn mount(device: Arc<D>) -> Result<Self> {
        let table = read_fit(&*device)?;
        let next_free_lba = next_free_lba(table.entries());
        info!(
            "mounted: {} entries in use, next free block {}",
            table.occupied().count(),
            next_free_lba
        );
        Ok(Self {
            device,
            table,
            next_free_lba,
        })
    }

    /// Discards the index. Data blocks are left as they are, so old file contents stay
    /// on disk until something overwrites them.
    pub fn format(&mut self) -> Result<()> {
        self.table.clear_all();
        self.next_free_lba = FIRST_DATA_BLOCK;
        self.flush()?;
        info!("formatted");
        Ok(())
    }

    /// Writes the whole table block back to the device.
    pub fn flush(&self) -> Result<()> {
        write_fit(&*self.device, &self.table)
    }

    /// Occupied entries in table order. Directories included.
    pub fn list(&self) -> Vec<DirEntry> {
        self.table.occupied().cloned().collect()
    }

    /// Occupied entries sitting directly inside `dir`, in table order.
    pub fn read_dir(&self, dir: &str) -> Vec<DirEntry> {
        self.table
            .occupied()
            .filter(|entry| path::child_name(dir, &entry.name).is_some())
            .cloned()
            .collect()
    }

    pub fn stat(&self, name: &str) -> Result<&DirEntry> {
        self.table
            .find(name)
            .and_then(|slot| self.table.get(slot))
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// Reads the full contents of `name`.
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        let entry = self.stat(name)?;
        let size = entry.size_bytes as usize;
        if size == 0 {
            return Ok(Vec::new());
        }
        if size > MAX_FSIZE {
            return Err(Error::Format(format!(
                "entry '{}' claims {} bytes, more than the {} byte limit",
                name, size, MAX_FSIZE
            )));
        }

        let mut buf = vec![0u8; entry.blocks() as usize * BLOCK_SIZE];
        let available = self.device.read_blocks(entry.start_lba, &mut buf)?;
        if available < size {
            warn!("'{}' runs past the end of the image ({} of {} bytes)", name, available, size);
            return Err(Error::Format(format!(
                "data of '{}' truncated: {} of {} bytes present",
                name, available, size
            )));
        }
        // The tail of the last block may hold stale bytes of an older file.
        buf.truncate(size);
        Ok(buf)
    }

    /// Resolves `name` into its tagged form.
    pub fn lookup(&self, name: &str) -> Result<Entry> {
        if self.stat(name)?.is_dir() {
            Ok(Entry::Directory)
        } else {
            self.read(name).map(Entry::File)
        }
    }

    /// Stores a new file. Never overwrites: an existing name, directory or not,
    /// is rejected.
    pub fn write(&mut self, name: &str, data: &[u8]) -> Result<()> {
        validate_name(name)?;
        if data.len() > MAX_FSIZE {
            return Err(Error::InvalidArgument(format!(
                "file data is too large ({} bytes, max {})",
                data.len(),
                MAX_FSIZE
            )));
        }
        if self.table.find(name).is_some() {
            return Err(Error::AlreadyExists(name.to_string()));
        }
        let slot = self.table.first_free().ok_or(Error::TableFull)?;

        let start_lba = self.next_free_lba;
        let blocks = blocks_for(data.len());
        let end_lba = start_lba.checked_add(blocks).ok_or(Error::OutOfSpace)?;

        // Data goes down before the index. A failure in between leaves orphaned
        // blocks, never an entry pointing at unwritten data.
        if !data.is_empty() {
            self.device.write_blocks(start_lba, data)?;
        }

        self.table.set(
            slot,
            DirEntry {
                name: name.to_string(),
                start_lba,
                size_bytes: data.len() as u32,
            },
        );
        self.next_free_lba = end_lba;
        debug!(
            "write '{}': slot {}, blocks {}..{}, {} bytes",
            name,
            slot,
            start_lba,
            end_lba,
            data.len()
        );
        self.flush()
    }

    /// Creates a directory entry, appending the separator if `name` lacks one.
    pub fn create_dir(&mut self, name: &str) -> Result<()> {
        self.write(&path::dir_name(name), &[])
    }

    /// Frees the slot holding `name`.
    /// The data blocks are neither zeroed nor returned to the allocator.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        let slot = self
            .table
            .find(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;
        self.table.clear(slot);
        debug!("delete '{}': slot {} freed", name, slot);
        self.flush()
    }

    /// Edits a file by deleting it and writing it again at the end of the used space.
    /// A missing file is simply created.
    pub fn replace(&mut self, name: &str, data: &[u8]) -> Result<()> {
        match self.delete(name) {
            Ok(()) | Err(Error::NotFound(_)) => {}
            Err(e) => return Err(e),
        }
        self.write(name, data)
    }

    pub fn next_free_lba(&self) -> u32 {
        self.next_free_lba
    }

    pub fn table(&self) -> &FileIndexTable {
        &self.table
    }

    pub fn device(&self) -> Arc<D> {
        Arc::clone(&self.device)
    }

    /// Human readable summary of the table.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} of {} slots in use, next free block {}",
            self.table.occupied().count(),
            MAX_FILES,
            self.next_free_lba
        );
        for (slot, entry) in self.table.entries().iter().enumerate() {
            if entry.is_free() {
                continue;
            }
            let _ = writeln!(
                out,
                "  #{:<2} {} {:<31} lba {:<8} {} B",
                slot,
                if entry.is_dir() { "[d]" } else { "[f]" },
                entry.name,
                entry.start_lba,
                entry.size_bytes
            );
        }
        out
    }
}
