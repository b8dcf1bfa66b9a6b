use crate::config::*;
use crate::Error;
use crate::Result;

/// One slot of the file index table.
/// On disk: 32-byte NUL-padded name, start_lba (u32 LE), size_bytes (u32 LE).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DirEntry {
    pub name: String,     // Empty for a free slot
    pub start_lba: u32,   // First data block, relative to the filesystem base
    pub size_bytes: u32,  // Exact byte length of the data
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// What a name resolves to at the API boundary.
/// Directories carry no data, they only exist as names ending with a separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    File(Vec<u8>),
    Directory,
}

impl DirEntry {
    pub const FREE: Self = Self {
        name: String::new(),
        start_lba: 0,
        size_bytes: 0,
    };

    pub fn new(name: &str, start_lba: u32, size_bytes: u32) -> Result<Self> {
        validate_name(name)?;
        Ok(Self {
            name: name.to_string(),
            start_lba,
            size_bytes,
        })
    }

    pub fn is_free(&self) -> bool {
        self.name.is_empty()
    }

    pub fn is_dir(&self) -> bool {
        self.name.ends_with(DIR_SEPARATOR) && self.size_bytes == 0
    }

    pub fn kind(&self) -> EntryKind {
        if self.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        }
    }

    /// Number of data blocks this entry occupies.
    pub fn blocks(&self) -> u32 {
        crate::allocator::blocks_for(self.size_bytes as usize)
    }

    pub fn name_eq(&self, name: &str) -> bool {
        !self.is_free() && self.name.as_bytes() == name.as_bytes()
    }
}

/// A name must be non-empty, free of NUL and fit in the name buffer with its terminator.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidArgument("file name is empty".to_string()));
    }
    if name.contains('\0') {
        return Err(Error::InvalidArgument(format!(
            "file name {:?} contains a NUL byte",
            name
        )));
    }
    if name.len() >= MAX_FILE_NAME_LEN {
        return Err(Error::InvalidArgument(format!(
            "file name '{}' is too long ({} bytes, max {})",
            name,
            name.len(),
            MAX_FILE_NAME_LEN - 1
        )));
    }
    Ok(())
}
