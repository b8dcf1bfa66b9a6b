//! Common utilities for tests

#![allow(unused)]

use std::sync::Mutex;

use fitfs::BlockDevice;
use fitfs::Error;
use fitfs::Result;
use fitfs::BLOCK_SIZE;

pub const ORANGE: &str = "\x1b[38;5;214m";
pub const RESET: &str = "\x1b[0m";

/// Provides a macro for logging messages during tests.
/// e.g. log!("placeholder") -> println!("[test] placeholder");
#[macro_export]
macro_rules! log {
    ($msg:expr) => {
        println!("{}[test] {}{}", crate::common::ORANGE, $msg, crate::common::RESET)
    };
    ($msg:expr, $($arg:tt)*) => {
        println!("{}[test] {}{}", crate::common::ORANGE, format!($msg, $($arg)*), crate::common::RESET)
    };
}

/// In-memory image. Grows on write like a sparse file and reports short reads past
/// its end, the same way a host image file does.
pub struct RamDisk {
    inner: Mutex<Vec<u8>>,
}

impl RamDisk {
    pub fn new() -> Self {
        RamDisk {
            inner: Mutex::new(Vec::new()),
        }
    }

    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        RamDisk {
            inner: Mutex::new(bytes),
        }
    }

    /// Copy of the raw image bytes.
    pub fn raw(&self) -> Vec<u8> {
        self.inner.lock().unwrap().clone()
    }

    /// Raw bytes of one block, zero-filled past the end of the image.
    pub fn block(&self, block_id: u32) -> Vec<u8> {
        let mut buf = vec![0u8; BLOCK_SIZE];
        self.read_blocks(block_id, &mut buf).unwrap();
        buf
    }
}

impl BlockDevice for RamDisk {
    fn read_blocks(&self, block_id: u32, buf: &mut [u8]) -> Result<usize> {
        if buf.len() % BLOCK_SIZE != 0 {
            return Err(Error::InvalidArgument("unaligned read".to_string()));
        }
        let data = self.inner.lock().unwrap();
        let start = (block_id as usize * BLOCK_SIZE).min(data.len());
        let end = (start + buf.len()).min(data.len());
        let available = end - start;
        buf[..available].copy_from_slice(&data[start..end]);
        buf[available..].fill(0);
        Ok(available)
    }

    fn write_blocks(&self, block_id: u32, buf: &[u8]) -> Result<()> {
        let mut data = self.inner.lock().unwrap();
        let start = block_id as usize * BLOCK_SIZE;
        let end = start + buf.len();
        if data.len() < end {
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(buf);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        // In a RAM disk, flushing is a no-op since data is already in memory.
        Ok(())
    }
}

/// Wraps a RamDisk and fails every write to one block once armed.
pub struct FlakyDisk {
    pub disk: RamDisk,
    fail_block: Mutex<Option<u32>>,
}

impl FlakyDisk {
    pub fn new() -> Self {
        FlakyDisk {
            disk: RamDisk::new(),
            fail_block: Mutex::new(None),
        }
    }

    pub fn fail_writes_to(&self, block_id: u32) {
        *self.fail_block.lock().unwrap() = Some(block_id);
    }
}

impl BlockDevice for FlakyDisk {
    fn read_blocks(&self, block_id: u32, buf: &mut [u8]) -> Result<usize> {
        self.disk.read_blocks(block_id, buf)
    }

    fn write_blocks(&self, block_id: u32, buf: &[u8]) -> Result<()> {
        if *self.fail_block.lock().unwrap() == Some(block_id) {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "injected write failure",
            )));
        }
        self.disk.write_blocks(block_id, buf)
    }

    fn flush(&self) -> Result<()> {
        self.disk.flush()
    }
}
