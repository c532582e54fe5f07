//! `FatFs`: the consumer-facing facade bundling the sector reader, boot
//! geometry, region layout, and FAT table behind one handle.
//!
//! A `FileSystem` struct bundling the same `device`/`bpb`/`fat` triple
//! under `FileSystem::open` exists elsewhere in this lineage but sits
//! unwired. This crate's version drops the free-cluster bookkeeping and
//! `FSInfo` handling that exist there only to support allocation for
//! writes.

use std::path::Path;

use crate::bpb::{BootSector, FatVariant, RegionLayout};
use crate::dir::{self, DirectoryRecord};
use crate::error::FatError;
use crate::fat::FatTable;
use crate::file;
use crate::reader::ImageReader;

/// An opened FAT image: boot geometry, region layout and the FAT table
/// are parsed once at [`FatFs::open`] and then held immutable for the
/// life of the handle.
pub struct FatFs {
    reader: ImageReader,
    boot: BootSector,
    layout: RegionLayout,
    fat: FatTable,
}

impl FatFs {
    /// Opens `path`, parses its boot sector, and loads its FAT region.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FatError> {
        let mut reader = ImageReader::open(path)?;
        let boot = BootSector::parse(&mut reader)?;
        let layout = boot.region_layout();
        let fat = FatTable::load(&mut reader, &boot, &layout)?;
        Ok(Self {
            reader,
            boot,
            layout,
            fat,
        })
    }

    pub fn boot_sector(&self) -> &BootSector {
        &self.boot
    }

    pub fn layout(&self) -> &RegionLayout {
        &self.layout
    }

    pub fn variant(&self) -> FatVariant {
        self.boot.variant
    }

    /// Enumerates directory records starting at `start_cluster`.
    /// `start_cluster == 0` selects the FAT12/16 fixed root (or the
    /// FAT32 root cluster); any other value walks that cluster's chain.
    pub fn list(&mut self, start_cluster: u32) -> Result<Vec<DirectoryRecord>, FatError> {
        dir::list(
            &mut self.reader,
            &self.boot,
            &self.layout,
            &self.fat,
            start_cluster,
        )
    }

    /// Fills `dest` with the bytes of the file whose chain starts at
    /// `start_cluster`. Returns the number of bytes written; callers
    /// truncate to the directory record's `file_size` themselves.
    pub fn read_file(&mut self, start_cluster: u32, dest: &mut [u8]) -> Result<usize, FatError> {
        file::read_file(
            &mut self.reader,
            &self.boot,
            &self.layout,
            &self.fat,
            start_cluster,
            dest,
        )
    }
}
