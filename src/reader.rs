//! Sector Reader (C1): absolute-offset byte-range reads into a caller
//! buffer, backed by a regular file opened in binary mode.
//!
//! Grounded on a `block_device::BlockDevice` trait and its std-mode
//! implementation over `std::fs::File`
//! (`examples/fat32-fs-std/src/device.rs`), generalized from a fixed
//! 512-byte block size to a runtime-configurable sector size (sector 0
//! is read at the default 512 before the true size is known).

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::FatError;

/// The sector size assumed before the boot sector has been parsed.
pub const DEFAULT_SECTOR_SIZE: u16 = 512;

/// Absolute-offset byte-range reader over a disk image file.
pub struct ImageReader {
    file: File,
    sector_size: u16,
}

impl ImageReader {
    /// Opens the image at `path` for reading. Fails with
    /// [`FatError::Io`] if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FatError> {
        let file = File::open(path)?;
        Ok(Self {
            file,
            sector_size: DEFAULT_SECTOR_SIZE,
        })
    }

    pub fn sector_size(&self) -> u16 {
        self.sector_size
    }

    /// Replaces the current sector size. The boot sector decoder calls
    /// this exactly once, right after classifying the volume.
    pub fn set_sector_size(&mut self, sector_size: u16) {
        log::debug!(
            "sector size {} -> {}",
            self.sector_size,
            sector_size
        );
        self.sector_size = sector_size;
    }

    /// Copies exactly `sector_count * sector_size` bytes from absolute
    /// byte offset `offset_sector * sector_size` into `dest`.
    ///
    /// `dest` must be at least that long. Returns the number of bytes
    /// actually read (equal to the requested length on success); fails
    /// with [`FatError::Io`] on seek/read error or [`FatError::ShortRead`]
    /// if fewer bytes were available than requested.
    pub fn read(
        &mut self,
        offset_sector: u64,
        sector_count: u32,
        dest: &mut [u8],
    ) -> Result<usize, FatError> {
        let sector_size = self.sector_size as u64;
        let want = sector_size * sector_count as u64;
        let dest = &mut dest[..want as usize];

        self.file
            .seek(SeekFrom::Start(offset_sector * sector_size))?;

        let mut read_so_far = 0usize;
        while read_so_far < dest.len() {
            let n = self.file.read(&mut dest[read_so_far..])?;
            if n == 0 {
                break;
            }
            read_so_far += n;
        }

        if read_so_far < dest.len() {
            return Err(FatError::ShortRead {
                expected: dest.len(),
                got: read_so_far,
            });
        }
        Ok(read_so_far)
    }
}
