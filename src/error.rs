use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FsError {
    #[error("I/O failure on backing store: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed image: {0}")]
    Format(String),
    #[error("File '{0}' not found")]
    NotFound(String),
    #[error("File '{0}' already exists")]
    AlreadyExists(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("File table is full")]
    TableFull,
    #[error("Block address space exhausted")]
    OutOfSpace,
}

pub type Result<T> = core::result::Result<T, FsError>;
