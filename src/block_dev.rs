use crate::error::FsError;

/// Raw block access for the filesystem engine.
/// All block IDs are relative to wherever the filesystem begins on the device;
/// translating them to absolute positions is the implementor's job.
pub trait BlockDevice {
    /// Reads `buf.len() / block_size()` consecutive blocks starting at `block_id`.
    /// buf.len() must be a multiple of block_size().
    /// Returns the number of bytes the backing store actually held. Anything past
    /// that point is zero-filled in `buf`.
    fn read_blocks(&self, block_id: u32, buf: &mut [u8]) -> Result<usize, FsError>;

    /// Writes `buf` starting at the first byte of `block_id`.
    /// Exactly `buf.len()` bytes are written, the last block is not padded.
    fn write_blocks(&self, block_id: u32, buf: &[u8]) -> Result<(), FsError>;

    /// Flushes any buffered writes down to the backing store.
    fn flush(&self) -> Result<(), FsError>;

    /// Returns the size of each block in bytes.
    fn block_size(&self) -> usize {
        crate::config::BLOCK_SIZE
    }
}
