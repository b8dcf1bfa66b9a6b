//! fitfs is a flat file storage format for small hobby OS disks.
//! No subdirectory tree, permissions, timestamps, journaling or free-space reclamation.
//!
//! fitfs linear layout (block-relative to the filesystem base):
//! - Block 0: File Index Table, 12 fixed 40-byte entries
//! - Block 1..: File data, one contiguous run per file, in allocation order
//!
//! The base is block 0 of the image for a whole-disk filesystem, or block 30720 when
//! the first 15 MiB hold a boot partition.
//!
//! fitfs's 4 layers (from bottom to top):
//! 1. Block Device: Raw block access, base offset translation.   | User implemented or ImageFile
//! 2. FIT: Fixed-layout codec for the index block.               | Fs implemented
//! 3. Allocator: Bump cursor recomputed from the table.          | Fs implemented
//! 4. FileSystem: File and directory operations over the table.  | Fs implemented

mod config;
mod error;
mod block_dev;
mod image;
mod structs;
mod allocator;
pub mod path;
mod fit;
mod fs;

pub use block_dev::BlockDevice;
pub use config::*;
pub use image::{ImageFile, Layout};
pub use structs::*;
pub use allocator::{blocks_for, next_free_lba};
pub use fit::{decode, encode, read_fit, write_fit, FileIndexTable};
pub use fs::*;
pub use error::FsError as Error;
pub use error::Result;
