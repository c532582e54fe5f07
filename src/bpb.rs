//! Boot Sector Decoder (C2): BIOS Parameter Block parsing and region
//! geometry derivation.
//!
//! Grounded on a `bpb::BIOSParameterBlock` (offset table, `fat_type()`,
//! `root_dir_sector_cnt()`, `first_data_sector()`) and on
//! `original_source/FAT.c`'s `initFileFAT`/`localEachRegion`/`fatType`,
//! which is where the FAT12/16 16-bit fallback fields come from: the
//! BIOSParameterBlock parser only ever reads the FAT32 32-bit fields,
//! since it targets FAT32 volumes exclusively.

use crate::error::FatError;
use crate::reader::ImageReader;
use crate::{read_le_u16, read_le_u32};

/// Clusters-below-this-count thresholds used to classify the volume,
/// per the Microsoft FAT specification note that FAT type is a function
/// of the *data cluster count*, never an on-disk identifier string.
const MAX_CLUSTER_FAT12: u32 = 4085;
const MAX_CLUSTER_FAT16: u32 = 65525;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatVariant {
    Fat12,
    Fat16,
    Fat32,
}

impl FatVariant {
    /// Classify from the count of data-region clusters. Sector-count
    /// fields and on-disk type strings are never consulted; only the
    /// data cluster count decides.
    fn classify(data_cluster_count: u32) -> Self {
        if data_cluster_count < MAX_CLUSTER_FAT12 {
            FatVariant::Fat12
        } else if data_cluster_count < MAX_CLUSTER_FAT16 {
            FatVariant::Fat16
        } else {
            FatVariant::Fat32
        }
    }

    /// The variant-specific end-of-chain threshold: a FAT entry at or
    /// above this value terminates a cluster chain. The FAT32 value is
    /// the 28-bit-masked form, applied uniformly before comparison.
    pub fn end_of_chain_threshold(self) -> u32 {
        match self {
            FatVariant::Fat12 => 0x0FF8,
            FatVariant::Fat16 => 0xFFF8,
            FatVariant::Fat32 => 0x0FFF_FFF8,
        }
    }

    /// The bad-cluster marker value, one less than the end-of-chain
    /// threshold.
    pub fn bad_cluster_marker(self) -> u32 {
        self.end_of_chain_threshold() - 1
    }
}

/// The immutable result of parsing sector 0.
#[derive(Debug, Clone, Copy)]
pub struct BootSector {
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub reserved_sector_count: u16,
    pub fat_count: u8,
    pub root_entry_count: u16,
    pub fat_size_sectors: u32,
    pub total_sectors: u32,
    pub root_cluster: u32,
    pub variant: FatVariant,
}

impl BootSector {
    /// Reads sector 0 at the default 512-byte sector size and parses
    /// the BPB fields at their fixed offsets. Fails with
    /// [`FatError::BadBootSector`] if the fields are impossible, and
    /// sets the reader's true sector size on success.
    pub fn parse(reader: &mut ImageReader) -> Result<Self, FatError> {
        let sector_size = reader.sector_size();
        let mut buf = vec![0u8; sector_size as usize];
        reader.read(0, 1, &mut buf)?;

        let bytes_per_sector = read_le_u16(&buf[0x0B..]);
        let sectors_per_cluster = buf[0x0D];
        let reserved_sector_count = read_le_u16(&buf[0x0E..]);
        let fat_count = buf[0x10];
        let root_entry_count = read_le_u16(&buf[0x11..]);

        let total_sectors_16 = read_le_u16(&buf[0x13..]);
        let fat_size_16 = read_le_u16(&buf[0x16..]);
        let total_sectors_32 = read_le_u32(&buf[0x20..]);
        let fat_size_32 = read_le_u32(&buf[0x24..]);
        let root_cluster = read_le_u32(&buf[0x2C..]);

        let total_sectors = if total_sectors_16 != 0 {
            total_sectors_16 as u32
        } else {
            total_sectors_32
        };
        let fat_size_sectors = if fat_size_16 != 0 {
            fat_size_16 as u32
        } else {
            fat_size_32
        };

        if bytes_per_sector == 0 || !bytes_per_sector.is_power_of_two() {
            return Err(FatError::BadBootSector(
                "bytes_per_sector is zero or not a power of two",
            ));
        }
        if sectors_per_cluster == 0 {
            return Err(FatError::BadBootSector("sectors_per_cluster is zero"));
        }
        if total_sectors == 0 {
            return Err(FatError::BadBootSector("total_sectors is zero"));
        }

        let data_cluster_count = total_sectors / sectors_per_cluster as u32;
        let variant = FatVariant::classify(data_cluster_count);

        log::debug!(
            "boot sector: {:?}, bytes_per_sector={} sectors_per_cluster={} total_sectors={}",
            variant,
            bytes_per_sector,
            sectors_per_cluster,
            total_sectors
        );

        reader.set_sector_size(bytes_per_sector);

        Ok(Self {
            bytes_per_sector,
            sectors_per_cluster,
            reserved_sector_count,
            fat_count,
            root_entry_count,
            fat_size_sectors,
            total_sectors,
            root_cluster,
            variant,
        })
    }

    /// The count of data-region clusters, used for variant
    /// classification. Exposed for tests that check the classification
    /// law directly.
    pub fn data_cluster_count(&self) -> u32 {
        self.total_sectors / self.sectors_per_cluster as u32
    }

    /// Derives the sector-region layout from this boot sector.
    pub fn region_layout(&self) -> RegionLayout {
        let fat_start_sector = self.reserved_sector_count as u64;
        let fat_region_sectors = self.fat_size_sectors as u64 * self.fat_count as u64;
        let root_dir_start_sector = fat_start_sector + fat_region_sectors;
        let root_dir_bytes = 32u64 * self.root_entry_count as u64;
        let root_dir_sectors =
            (root_dir_bytes + self.bytes_per_sector as u64 - 1) / self.bytes_per_sector as u64;
        let data_start_sector = root_dir_start_sector + root_dir_sectors;

        RegionLayout {
            fat_start_sector,
            fat_region_sectors,
            root_dir_start_sector,
            root_dir_sectors,
            data_start_sector,
        }
    }

    /// The absolute sector number of the first sector of `cluster`.
    /// `cluster` must be a valid data cluster (>= 2).
    pub fn first_sector_of_cluster(&self, layout: &RegionLayout, cluster: u32) -> u64 {
        debug_assert!(cluster >= crate::FIRST_DATA_CLUSTER);
        layout.data_start_sector
            + (cluster as u64 - crate::FIRST_DATA_CLUSTER as u64)
                * self.sectors_per_cluster as u64
    }
}

/// Derived sector-region layout:
/// `data_start_sector = reserved_sector_count + fat_size_sectors *
/// fat_count + ceil(32 * root_entry_count / bytes_per_sector)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionLayout {
    pub fat_start_sector: u64,
    pub fat_region_sectors: u64,
    pub root_dir_start_sector: u64,
    pub root_dir_sectors: u64,
    pub data_start_sector: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fat12_boot_sector_bytes() -> Vec<u8> {
        let mut buf = vec![0u8; 512];
        buf[0x0B..0x0D].copy_from_slice(&512u16.to_le_bytes());
        buf[0x0D] = 1; // sectors_per_cluster
        buf[0x0E..0x10].copy_from_slice(&1u16.to_le_bytes()); // reserved
        buf[0x10] = 2; // fat_count
        buf[0x11..0x13].copy_from_slice(&224u16.to_le_bytes()); // root_entry_count
        buf[0x13..0x15].copy_from_slice(&2880u16.to_le_bytes()); // total_sectors_16
        buf[0x16..0x18].copy_from_slice(&9u16.to_le_bytes()); // fat_size_16
        buf
    }

    fn write_image(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(bytes).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn classify_thresholds() {
        assert_eq!(FatVariant::classify(0), FatVariant::Fat12);
        assert_eq!(FatVariant::classify(MAX_CLUSTER_FAT12 - 1), FatVariant::Fat12);
        assert_eq!(FatVariant::classify(MAX_CLUSTER_FAT12), FatVariant::Fat16);
        assert_eq!(FatVariant::classify(MAX_CLUSTER_FAT16 - 1), FatVariant::Fat16);
        assert_eq!(FatVariant::classify(MAX_CLUSTER_FAT16), FatVariant::Fat32);
    }

    #[test]
    fn parses_fat12_boot_sector() {
        let bytes = fat12_boot_sector_bytes();
        let file = write_image(&bytes);
        let mut reader = ImageReader::open(file.path()).unwrap();
        let boot = BootSector::parse(&mut reader).unwrap();

        assert_eq!(boot.variant, FatVariant::Fat12);
        assert_eq!(boot.bytes_per_sector, 512);
        assert_eq!(boot.fat_size_sectors, 9);
        assert_eq!(boot.total_sectors, 2880);
    }

    #[test]
    fn rejects_zero_bytes_per_sector() {
        let mut bytes = fat12_boot_sector_bytes();
        bytes[0x0B..0x0D].copy_from_slice(&0u16.to_le_bytes());
        let file = write_image(&bytes);
        let mut reader = ImageReader::open(file.path()).unwrap();
        assert!(matches!(
            BootSector::parse(&mut reader),
            Err(FatError::BadBootSector(_))
        ));
    }

    #[test]
    fn region_layout_matches_geometry_formula() {
        let bytes = fat12_boot_sector_bytes();
        let file = write_image(&bytes);
        let mut reader = ImageReader::open(file.path()).unwrap();
        let boot = BootSector::parse(&mut reader).unwrap();
        let layout = boot.region_layout();

        assert_eq!(layout.fat_start_sector, 1);
        assert_eq!(layout.fat_region_sectors, 18);
        assert_eq!(layout.root_dir_start_sector, 19);
        assert_eq!(layout.root_dir_sectors, 14); // ceil(32*224/512)
        assert_eq!(layout.data_start_sector, 33);
    }
}
