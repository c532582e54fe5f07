//! File Reader (C6): materializes a file's bytes by concatenating its
//! chain's data clusters.
//!
//! Grounded on `original_source/FAT.c`'s `loadFile` (walk the chain,
//! append `sectors_per_cluster` sectors per cluster into the
//! destination buffer) and on a sibling `file::File::read`. Unlike that
//! reader, this one does not consult `file_size` to bound the read:
//! truncating to the declared length is the caller's responsibility.

use std::io;

use crate::bpb::BootSector;
use crate::error::FatError;
use crate::fat::{ClusterChain, FatTable};
use crate::reader::ImageReader;

/// Walks the chain starting at `start_cluster` and reads
/// `sectors_per_cluster` sectors per cluster into consecutive regions of
/// `dest`. `dest` must be at least `chain_length * sectors_per_cluster *
/// bytes_per_sector` bytes long; returns the number of bytes actually
/// written.
///
/// Fails with [`FatError::Io`] on any underlying read failure; the
/// caller must not assume `dest` holds usable data past the point of
/// failure.
pub fn read_file(
    reader: &mut ImageReader,
    boot: &BootSector,
    layout: &crate::bpb::RegionLayout,
    fat: &FatTable,
    start_cluster: u32,
    dest: &mut [u8],
) -> Result<usize, FatError> {
    let cluster_bytes = boot.sectors_per_cluster as usize * boot.bytes_per_sector as usize;
    let mut written = 0usize;

    for cluster in ClusterChain::new(fat, boot.variant, start_cluster) {
        let cluster = cluster?;
        let sector = boot.first_sector_of_cluster(layout, cluster);
        let slot = dest.get_mut(written..written + cluster_bytes).ok_or_else(|| {
            FatError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "destination buffer too small: need at least {} more bytes",
                    cluster_bytes
                ),
            ))
        })?;
        reader.read(sector, boot.sectors_per_cluster as u32, slot)?;
        written += cluster_bytes;
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bpb::{FatVariant, RegionLayout};
    use std::io::Write;

    /// One reserved sector, one FAT sector, no root directory, two data
    /// clusters of one sector each: cluster 2 holds "Hello, " and
    /// cluster 3 (chained from 2) holds "world!".
    fn two_cluster_image() -> (tempfile::NamedTempFile, BootSector, RegionLayout) {
        let mut image = vec![0u8; 4 * 512];

        // FAT16 region at sector 1: entry(2) = 3, entry(3) = EOC.
        image[512 + 4..512 + 6].copy_from_slice(&3u16.to_le_bytes());
        image[512 + 6..512 + 8].copy_from_slice(&0xFFFFu16.to_le_bytes());

        image[1024..1024 + 7].copy_from_slice(b"Hello, ");
        image[1536..1536 + 6].copy_from_slice(b"world!");

        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&image).unwrap();
        f.flush().unwrap();

        let boot = BootSector {
            bytes_per_sector: 512,
            sectors_per_cluster: 1,
            reserved_sector_count: 1,
            fat_count: 1,
            root_entry_count: 0,
            fat_size_sectors: 1,
            total_sectors: 4,
            root_cluster: 2,
            variant: FatVariant::Fat16,
        };
        let layout = boot.region_layout();
        (f, boot, layout)
    }

    #[test]
    fn reads_chained_clusters_in_order() {
        let (image, boot, layout) = two_cluster_image();
        let mut reader = ImageReader::open(image.path()).unwrap();
        let fat = FatTable::load(&mut reader, &boot, &layout).unwrap();

        let mut dest = vec![0u8; 1024];
        let written = read_file(&mut reader, &boot, &layout, &fat, 2, &mut dest).unwrap();

        assert_eq!(written, 1024);
        assert_eq!(&dest[0..7], b"Hello, ");
        assert_eq!(&dest[512..518], b"world!");
    }

    #[test]
    fn errors_when_destination_too_small() {
        let (image, boot, layout) = two_cluster_image();
        let mut reader = ImageReader::open(image.path()).unwrap();
        let fat = FatTable::load(&mut reader, &boot, &layout).unwrap();

        let mut dest = vec![0u8; 512];
        let err = read_file(&mut reader, &boot, &layout, &fat, 2, &mut dest).unwrap_err();
        assert!(matches!(err, FatError::Io(_)));
    }
}
