pub const BLOCK_SIZE: usize = 512;
pub const FIT_BLOCK_ID: u32 = 0; // Block ID of the file index table, relative to the base offset
pub const FIRST_DATA_BLOCK: u32 = 1; // Data blocks start right after the table
pub const MAX_FSIZE: usize = 2 * 1024 * 1024; // 2 MiB

pub const MAX_FILE_NAME_LEN: usize = 32; // Name buffer, including the NUL terminator
pub const DIR_ENTRY_SIZE: usize = MAX_FILE_NAME_LEN + 4 + 4; // name + start_lba + size_bytes
pub const MAX_FILES: usize = BLOCK_SIZE / DIR_ENTRY_SIZE; // 12 entries fit in one block
pub const FIT_SIZE: usize = MAX_FILES * DIR_ENTRY_SIZE; // Bytes of the table actually used

pub const WHOLE_DISK_OFFSET: u64 = 0;
pub const PARTITION_OFFSET: u64 = 30720; // 15 MiB reserved for the boot loader

pub const DIR_SEPARATOR: char = '/';
