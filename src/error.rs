//! Error kinds surfaced by every fallible operation in this crate.
//!
//! One flat enum covers every failure mode (bad geometry, short reads,
//! corrupt chains) since this crate has a single public surface, rather
//! than the several internal module boundaries a `FatError`/`DirError`/
//! `FileError` split would imply.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FatError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("short read: expected {expected} bytes, got {got}")]
    ShortRead { expected: usize, got: usize },

    #[error("bad boot sector: {0}")]
    BadBootSector(&'static str),

    #[error("corrupt cluster chain: cluster {cluster} has FAT entry 0x{entry:08X}")]
    CorruptChain { cluster: u32, entry: u32 },
}
