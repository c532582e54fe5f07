//! Minimal read-only browser over a FAT image, in the spirit of a
//! sibling `fat32-fs-std` demo binary but with no write/shell commands:
//! this crate's core only reads.
//!
//! Usage: `fatls <image-path> [cluster]`
//!
//! With no cluster argument, lists the root directory. With a cluster
//! number, lists that cluster's chain as a directory instead (the
//! read-only half of `original_source/main.c`'s `APP` loop, which
//! descends into whichever entry the user selects).

use std::env;
use std::process::ExitCode;

use fatreader::FatFs;

fn main() -> ExitCode {
    env_logger::init();

    let mut args = env::args().skip(1);
    let image_path = match args.next() {
        Some(p) => p,
        None => {
            eprintln!("usage: fatls <image-path> [cluster]");
            return ExitCode::FAILURE;
        }
    };
    let cluster: u32 = match args.next() {
        Some(s) => match s.parse() {
            Ok(c) => c,
            Err(_) => {
                eprintln!("cluster must be a non-negative integer, got {:?}", s);
                return ExitCode::FAILURE;
            }
        },
        None => 0,
    };

    if let Err(e) = run(&image_path, cluster) {
        eprintln!("fatls: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run(image_path: &str, cluster: u32) -> Result<(), fatreader::FatError> {
    let mut fs = FatFs::open(image_path)?;
    let boot = fs.boot_sector();
    println!(
        "{:?} volume: {} bytes/sector, {} sectors/cluster",
        fs.variant(),
        boot.bytes_per_sector,
        boot.sectors_per_cluster
    );

    let records = fs.list(cluster)?;
    for (i, record) in records.iter().enumerate() {
        let name = String::from_utf8_lossy(record.raw_name());
        let kind = if record.is_directory() { "dir " } else { "file" };
        println!(
            "{:3}  {}  {:<11}  {:>10} bytes  cluster {}",
            i, kind, name, record.file_size, record.start_cluster
        );
    }

    Ok(())
}
