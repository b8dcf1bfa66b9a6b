//! Block device backed by a host disk image file.
//!
//! The filesystem may start at block 0 of the image or behind a reserved region
//! (e.g. a boot loader partition). Every block ID handed to [`ImageFile`] is relative
//! to that base; the absolute byte offset is `(base_block + block_id) * BLOCK_SIZE`.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::config::*;
use crate::{BlockDevice, Error, Result};

/// Where the filesystem begins on the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Filesystem occupies the image from block 0.
    #[default]
    WholeDisk,
    /// Filesystem starts after the 15 MiB boot partition.
    Partitioned,
    /// Filesystem starts at an arbitrary block.
    Custom(u64),
}

impl Layout {
    pub fn base_block(&self) -> u64 {
        match self {
            Layout::WholeDisk => WHOLE_DISK_OFFSET,
            Layout::Partitioned => PARTITION_OFFSET,
            Layout::Custom(base) => *base,
        }
    }
}

#[derive(Debug)]
pub struct ImageFile {
    file: File,
    path: PathBuf,
    base_block: u64,
}

impl ImageFile {
    /// Creates an empty image at `path` if nothing is there yet.
    /// Returns true if the image had to be created.
    pub fn ensure_exists(path: impl AsRef<Path>) -> Result<bool> {
        let path = path.as_ref();
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(_) => {
                info!("created empty image {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Opens an existing image for reading and writing.
    pub fn open(path: impl AsRef<Path>, layout: Layout) -> Result<Self> {
        let path = path.as_ref();
        let base_block = layout.base_block();
        if base_block.checked_mul(BLOCK_SIZE as u64).is_none() {
            return Err(Error::InvalidArgument(format!(
                "base block {} is past the largest addressable byte offset",
                base_block
            )));
        }
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(ImageFile {
            file,
            path: path.to_path_buf(),
            base_block,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base_block(&self) -> u64 {
        self.base_block
    }

    /// Absolute byte offset of a relative block ID.
    pub fn byte_offset(&self, block_id: u32) -> Result<u64> {
        self.base_block
            .checked_add(block_id as u64)
            .and_then(|block| block.checked_mul(BLOCK_SIZE as u64))
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "block {} past base {} overflows the byte offset",
                    block_id, self.base_block
                ))
            })
    }
}

impl BlockDevice for ImageFile {
    fn read_blocks(&self, block_id: u32, buf: &mut [u8]) -> Result<usize> {
        if buf.len() % BLOCK_SIZE != 0 {
            return Err(Error::InvalidArgument(format!(
                "read buffer of {} bytes is not block aligned",
                buf.len()
            )));
        }
        let mut file = &self.file;
        file.seek(SeekFrom::Start(self.byte_offset(block_id)?))?;

        // Images may end mid-block, so a short read is not an error here.
        let mut filled = 0;
        while filled < buf.len() {
            match file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        buf[filled..].fill(0);
        Ok(filled)
    }

    fn write_blocks(&self, block_id: u32, buf: &[u8]) -> Result<()> {
        let offset = self.byte_offset(block_id)?;
        debug!("image write: block {} (+{}), {} bytes at byte {}", block_id, self.base_block, buf.len(), offset);
        let mut file = &self.file;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(buf)?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let mut file = &self.file;
        file.flush()?;
        Ok(())
    }
}
