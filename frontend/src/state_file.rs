//! Snapshots on disk, gzip-compressed.

use std::io::{Read, Write};
use std::path::Path;

use ale_interface::Snapshot;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::error::CliError;

pub fn write(path: &Path, snapshot: &Snapshot) -> Result<(), CliError> {
    let file = std::fs::File::create(path).map_err(CliError::file(path))?;
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder
        .write_all(snapshot.as_bytes())
        .and_then(|_| encoder.finish())
        .map_err(CliError::file(path))?;
    tracing::info!(
        "saved {} state ({} bytes) to {}",
        snapshot.kind(),
        snapshot.encoded_len(),
        path.display()
    );
    Ok(())
}

pub fn read(path: &Path) -> Result<Snapshot, CliError> {
    let file = std::fs::File::open(path).map_err(CliError::file(path))?;
    let mut bytes = Vec::new();
    GzDecoder::new(file)
        .read_to_end(&mut bytes)
        .map_err(CliError::file(path))?;
    Ok(Snapshot::decode(&bytes)?)
}
